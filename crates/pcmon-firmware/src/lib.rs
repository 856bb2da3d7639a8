//! ESP32-S3 specific parts of the pcmon firmware
//!
//! Everything here needs esp-hal types and cannot compile for the desktop:
//! the UART telemetry link, the Wi-Fi/UDP link task, the AXP2101 backlight
//! and the settings baked in at build time.

#![no_std]

extern crate alloc;

pub mod backlight;
pub mod links;
pub mod settings;

/// [`pcmon_core::Clock`] backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl pcmon_core::Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
