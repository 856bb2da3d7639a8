//! Settings compiled in from `.env` by the build script.

use log::warn;
use pcmon_core::{MonitorConfig, WirelessMode};

pub const WIFI_SSID: Option<&str> = option_env!("PCMON_WIFI_SSID");
pub const WIFI_PASSWORD: &str = match option_env!("PCMON_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

const DEFAULT_UDP_PORT: u16 = 5005;

pub fn udp_port() -> u16 {
    match option_env!("PCMON_UDP_PORT").map(str::parse) {
        Some(Ok(port)) => port,
        Some(Err(_)) => {
            warn!("Invalid PCMON_UDP_PORT, using {}", DEFAULT_UDP_PORT);
            DEFAULT_UDP_PORT
        }
        None => DEFAULT_UDP_PORT,
    }
}

/// Monitor configuration for this build.
///
/// Wireless is forced off when no SSID was provided.
pub fn monitor_config() -> MonitorConfig {
    let mut config = MonitorConfig::default();

    if let Some(secs) = option_env!("PCMON_SLEEP_AFTER_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) => config = config.with_sleep_after_secs(secs),
            Err(_) => warn!("Invalid PCMON_SLEEP_AFTER_SECS {:?}, keeping default", secs),
        }
    }

    let wireless = match option_env!("PCMON_WIRELESS_MODE") {
        Some(name) => WirelessMode::from_name(name).unwrap_or_else(|| {
            warn!("Unknown PCMON_WIRELESS_MODE {:?}, using duplex", name);
            WirelessMode::Duplex
        }),
        None => WirelessMode::Duplex,
    };
    let wireless = if WIFI_SSID.is_some() {
        wireless
    } else {
        WirelessMode::Disabled
    };

    config.with_wireless(wireless)
}
