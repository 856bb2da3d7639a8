//! Panel backlight on the AXP2101 DLDO1 rail.
//!
//! The monitor loop is synchronous and the PMIC driver is async, so the
//! loop only records the wanted state in [`BACKLIGHT`] and
//! [`backlight_task`] applies it over I2C.

use axp2101_embedded::AsyncAxp2101;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use esp_hal::Async;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use log::{info, warn};
use pcmon_core::display::Backlight;

/// Latest requested backlight state.
pub static BACKLIGHT: Signal<CriticalSectionRawMutex, bool> = Signal::new();

pub type Pmic = AsyncAxp2101<I2c<'static, Async>>;

/// [`Backlight`] that forwards to [`backlight_task`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalBacklight;

impl Backlight for SignalBacklight {
    fn set_enabled(&mut self, on: bool) {
        BACKLIGHT.signal(on);
    }
}

/// Create the 400 kHz I2C bus the PMIC sits on.
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO12<'static>,
    scl: esp_hal::peripherals::GPIO11<'static>,
) -> Result<I2c<'static, Async>, esp_hal::i2c::master::ConfigError> {
    Ok(
        I2c::new(i2c0, I2cConfig::default().with_frequency(Rate::from_khz(400)))?
            .with_sda(sda)
            .with_scl(scl)
            .into_async(),
    )
}

/// Bring up the rails the panel needs. Failures are logged; the display
/// may still work on the PMIC's power-on defaults.
pub async fn init_power(i2c: I2c<'static, Async>) -> Pmic {
    info!("Configuring power management");
    let mut pmic = AsyncAxp2101::new(i2c);

    if let Err(e) = pmic.init().await {
        warn!("Power init failed: {:?}", e);
    }
    // ALDO4 feeds the panel logic, DLDO1 the backlight.
    if let Err(e) = pmic.set_aldo4_voltage(3300).await {
        warn!("ALDO4 voltage not set: {:?}", e);
    }
    if let Err(e) = pmic.enable_aldo4().await {
        warn!("ALDO4 not enabled: {:?}", e);
    }
    if let Err(e) = pmic.enable_dldo1().await {
        warn!("Backlight rail not enabled: {:?}", e);
    }
    info!("Power management ready");
    pmic
}

#[embassy_executor::task]
pub async fn backlight_task(mut pmic: Pmic) {
    loop {
        let on = BACKLIGHT.wait().await;
        let result = if on {
            pmic.enable_dldo1().await
        } else {
            pmic.disable_dldo1().await
        };
        match result {
            Ok(()) => info!("Backlight {}", if on { "on" } else { "off" }),
            Err(e) => warn!("Backlight switch failed: {:?}", e),
        }
    }
}
