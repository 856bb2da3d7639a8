//! Runtime configuration for the monitor.
//!
//! Screen geometry and colours are compile-time constants (see
//! [`crate::display`]). Everything that differs between builds or boards is
//! collected in [`MonitorConfig`] and chosen once at startup.

use serde::{Deserialize, Serialize};

/// Inactivity before the panel is put to sleep.
pub const DEFAULT_SLEEP_AFTER_MS: u64 = 60_000;

/// Maximum age of the last record for the status dot to show "fresh".
pub const DEFAULT_FRESHNESS_MS: u64 = 2_500;

/// Period of the status row redraw while awake.
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 1_000;

/// What the wireless link is allowed to do.
///
/// This replaces build-time selection of the radio stack: the firmware picks
/// one variant at startup and the monitor never branches on build flags.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessMode {
    /// Telemetry accepted on both links, echoes cross over.
    Duplex,
    /// Telemetry accepted on the wired link only; wireless carries the echo.
    EchoOnly,
    /// No wireless link at all.
    Disabled,
}

impl WirelessMode {
    /// Whether records arriving over the wireless link are parsed.
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Duplex)
    }

    /// Whether echoes may be pushed out over the wireless link.
    pub const fn accepts_output(self) -> bool {
        matches!(self, Self::Duplex | Self::EchoOnly)
    }

    /// Parse the names used in the firmware `.env` file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "duplex" => Some(Self::Duplex),
            "echo-only" | "echo" => Some(Self::EchoOnly),
            "disabled" | "off" | "none" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Duplex => "duplex",
            Self::EchoOnly => "echo-only",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Sleep after this much inactivity; `None` keeps the panel on forever.
    pub sleep_after_ms: Option<u64>,
    pub freshness_ms: u64,
    pub status_interval_ms: u64,
    pub wireless: WirelessMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sleep_after_ms: Some(DEFAULT_SLEEP_AFTER_MS),
            freshness_ms: DEFAULT_FRESHNESS_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            wireless: WirelessMode::Duplex,
        }
    }
}

impl MonitorConfig {
    pub fn with_sleep_after_ms(mut self, sleep_after_ms: Option<u64>) -> Self {
        self.sleep_after_ms = sleep_after_ms;
        self
    }

    /// Whole-second form used by build settings: `0` disables sleep and
    /// absurd values saturate instead of wrapping.
    pub fn with_sleep_after_secs(self, secs: u64) -> Self {
        match secs {
            0 => self.with_sleep_after_ms(None),
            secs => self.with_sleep_after_ms(Some(secs.saturating_mul(1_000))),
        }
    }

    pub fn with_freshness_ms(mut self, freshness_ms: u64) -> Self {
        self.freshness_ms = freshness_ms;
        self
    }

    pub fn with_status_interval_ms(mut self, status_interval_ms: u64) -> Self {
        self.status_interval_ms = status_interval_ms;
        self
    }

    pub fn with_wireless(mut self, wireless: WirelessMode) -> Self {
        self.wireless = wireless;
        self
    }
}
