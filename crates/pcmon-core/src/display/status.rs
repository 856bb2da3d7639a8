//! Status row: a freshness dot, a receive summary and the wireless state.

use super::layout::{Layout, STATUS_DOT_RADIUS_PX};
use super::surface::{Surface, TextSize, TextStyle};
use super::theme;
use crate::state::CurrentState;

pub const WAITING_TEXT: &str = "Waiting for data...";
pub const FRESH_TEXT: &str = "RX: fresh";
pub const STALE_TEXT: &str = "RX: stale";

/// Availability of the wireless link as shown in the status row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessStatus {
    /// Not configured for this build
    Off,
    /// Up and waiting for a peer
    Ready,
    /// A peer is connected
    Linked,
}

impl WirelessStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "WL: off",
            Self::Ready => "WL: ready",
            Self::Linked => "WL: linked",
        }
    }
}

pub struct StatusIndicator {
    layout: Layout,
    interval_ms: u64,
    freshness_ms: u64,
    last_drawn_ms: Option<u64>,
}

impl StatusIndicator {
    pub fn new(layout: Layout, interval_ms: u64, freshness_ms: u64) -> Self {
        Self {
            layout,
            interval_ms,
            freshness_ms,
            last_drawn_ms: None,
        }
    }

    /// Whether the periodic refresh is due.
    pub fn due(&self, now_ms: u64) -> bool {
        self.last_drawn_ms
            .is_none_or(|drawn| now_ms.saturating_sub(drawn) >= self.interval_ms)
    }

    pub fn last_drawn_ms(&self) -> Option<u64> {
        self.last_drawn_ms
    }

    /// Repaint the whole status row for `now_ms`.
    pub fn draw<S: Surface>(
        &mut self,
        surface: &mut S,
        now_ms: u64,
        state: &CurrentState,
        wireless: WirelessStatus,
    ) -> Result<(), S::Error> {
        let layout = self.layout;
        surface.fill_region(layout.status_area(), theme::BACKGROUND)?;

        let fresh = state.is_fresh(now_ms, self.freshness_ms);
        let dot = if fresh { theme::FRESH } else { theme::STALE };
        surface.fill_circle(layout.status_dot(), STATUS_DOT_RADIUS_PX, dot)?;

        let text = if !state.received_once() {
            WAITING_TEXT
        } else if fresh {
            FRESH_TEXT
        } else {
            STALE_TEXT
        };
        let style = TextStyle::new(TextSize::Medium, theme::TEXT, theme::BACKGROUND);
        surface.draw_text(text, layout.status_text_anchor(), style)?;

        let style = TextStyle::new(TextSize::Medium, theme::ACCENT, theme::BACKGROUND).right_aligned();
        surface.draw_text(wireless.label(), layout.status_right_anchor(), style)?;

        self.last_drawn_ms = Some(now_ms);
        Ok(())
    }
}
