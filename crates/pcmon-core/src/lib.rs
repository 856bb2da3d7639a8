//! Hardware-independent core library for pcmon
//!
//! This crate contains the whole telemetry pipeline of the pcmon display:
//! line framing and record parsing, the per-link multiplexer that merges
//! wired and wireless sources into one current state, the diff-based render
//! engine, the display power state machine and the telemetry echo.
//!
//! It is `#![no_std]` so it compiles on both the ESP32-S3 firmware and on
//! desktop hosts (for the simulator and tests). Hardware is reached only
//! through the traits in [`transport`], [`display::Surface`] and [`Clock`].

#![no_std]

extern crate alloc;

pub mod config;
pub mod display;
pub mod echo;
pub mod metrics;
pub mod monitor;
pub mod power;
pub mod protocol;
pub mod state;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{MonitorConfig, WirelessMode};
pub use metrics::Metrics;
pub use monitor::Monitor;

/// Monotonic millisecond clock.
///
/// Only differences between two readings are meaningful; the origin is
/// whatever the platform considers "boot".
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
