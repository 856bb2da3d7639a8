//! Display power state machine
//!
//! Two states and two edges. The controller only decides; the caller owns
//! the panel and carries out the effect of each [`PowerTransition`].

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Awake,
    Asleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    /// Blank the panel and turn the backlight off.
    Sleep,
    /// Backlight on, full repaint, render current metrics from scratch.
    Wake,
}

#[derive(Debug)]
pub struct PowerController {
    state: PowerState,
    sleep_after_ms: Option<u64>,
}

impl PowerController {
    /// `sleep_after_ms == None` disables sleeping entirely.
    pub const fn new(sleep_after_ms: Option<u64>) -> Self {
        Self {
            state: PowerState::Awake,
            sleep_after_ms,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_awake(&self) -> bool {
        self.state == PowerState::Awake
    }

    /// Check the inactivity timeout. `last_activity_ms` is the arrival time
    /// of the last record, or boot time if none arrived yet.
    pub fn evaluate(&mut self, now_ms: u64, last_activity_ms: u64) -> Option<PowerTransition> {
        let timeout = self.sleep_after_ms?;
        if self.state != PowerState::Awake {
            return None;
        }
        let idle_ms = now_ms.saturating_sub(last_activity_ms);
        if idle_ms > timeout {
            info!("Power: awake -> asleep (idle {} ms)", idle_ms);
            self.state = PowerState::Asleep;
            return Some(PowerTransition::Sleep);
        }
        None
    }

    /// A valid record arrived. Wakes the panel if it was asleep.
    pub fn on_telemetry(&mut self) -> Option<PowerTransition> {
        match self.state {
            PowerState::Asleep => {
                info!("Power: asleep -> awake (telemetry)");
                self.state = PowerState::Awake;
                Some(PowerTransition::Wake)
            }
            PowerState::Awake => None,
        }
    }
}
