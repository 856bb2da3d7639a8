//! Diff-based metrics renderer
//!
//! The engine remembers what it last put on screen and touches only the
//! pixels whose meaning changed. A growing bar is extended with the bar
//! colour, a shrinking one is cut back with the track colour, and value text
//! is repainted only when the displayed figure moves.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String;
use log::trace;

use super::layout::{Layout, PERCENT_LABEL_WIDTH_PX, Row, TEMPERATURE_LABEL_WIDTH_PX};
use super::surface::{Surface, TextSize, TextStyle};
use super::theme;
use crate::metrics::{Metrics, clamp_percent, round_non_negative, temperature_tenths};

pub const TITLE: &str = "PC Monitor";

/// Shown in place of a value the host could not read.
pub const UNAVAILABLE: &str = "N/A";

/// What a bar row currently shows. `shown` is the integer percentage in the
/// value column, -1 for "N/A".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarCache {
    pub width: Option<u32>,
    pub shown: Option<i32>,
}

/// Last drawn state of every row. `None` means "never drawn since the
/// screen was cleared", which forces the next update to draw it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawCache {
    pub cpu: BarCache,
    pub ram: BarCache,
    pub gpu: BarCache,
    /// Rounded GPU load the GPU row was last drawn for, -1 when unavailable
    pub gpu_rounded: Option<i32>,
    pub temp_tenths: Option<i32>,
    pub gpu_temp_tenths: Option<i32>,
}

impl DrawCache {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn bar_mut(&mut self, row: Row) -> Option<&mut BarCache> {
        match row {
            Row::Cpu => Some(&mut self.cpu),
            Row::Ram => Some(&mut self.ram),
            Row::Gpu => Some(&mut self.gpu),
            Row::GpuTemp | Row::Temp => None,
        }
    }

    fn temperature_mut(&mut self, row: Row) -> Option<&mut Option<i32>> {
        match row {
            Row::Temp => Some(&mut self.temp_tenths),
            Row::GpuTemp => Some(&mut self.gpu_temp_tenths),
            Row::Cpu | Row::Ram | Row::Gpu => None,
        }
    }
}

fn bar_color(row: Row) -> Rgb565 {
    match row {
        Row::Cpu => theme::CPU_BAR,
        Row::Ram => theme::RAM_BAR,
        _ => theme::GPU_BAR,
    }
}

pub struct RenderEngine {
    layout: Layout,
    cache: DrawCache,
}

impl RenderEngine {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            cache: DrawCache::default(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn cache(&self) -> &DrawCache {
        &self.cache
    }

    /// Forget what is on screen, e.g. after the panel was blanked.
    pub fn invalidate(&mut self) {
        self.cache = DrawCache::default();
    }

    /// Clear the panel and draw everything that never changes: title,
    /// separator, row labels and empty bar tracks.
    pub fn draw_chrome<S: Surface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        self.invalidate();
        let layout = self.layout;

        surface.fill_region(layout.screen_area(), theme::BACKGROUND)?;

        let heading = TextStyle::new(TextSize::Large, theme::TEXT, theme::BACKGROUND);
        surface.draw_text(TITLE, layout.title_anchor(), heading)?;
        surface.fill_region(layout.separator(), theme::TRACK)?;

        for row in Row::ALL {
            surface.draw_text(row.label(), layout.label_anchor(row), heading)?;
            if row.has_bar() {
                surface.fill_region(layout.track(row), theme::TRACK)?;
            }
        }
        Ok(())
    }

    /// Bring the screen in line with `metrics`, drawing only what changed.
    pub fn update<S: Surface>(&mut self, surface: &mut S, metrics: &Metrics) -> Result<(), S::Error> {
        self.update_bar(surface, Row::Cpu, Some(metrics.cpu))?;
        self.update_temperature(surface, Row::Temp, metrics.temp_c())?;
        self.update_bar(surface, Row::Ram, Some(metrics.ram))?;

        let gpu_rounded = metrics
            .gpu()
            .map_or(-1, |gpu| round_non_negative(clamp_percent(gpu)));
        if self.cache.gpu_rounded != Some(gpu_rounded) {
            self.update_bar(surface, Row::Gpu, metrics.gpu())?;
            self.cache.gpu_rounded = Some(gpu_rounded);
        }

        self.update_temperature(surface, Row::GpuTemp, metrics.gpu_temp_c())
    }

    fn update_bar<S: Surface>(
        &mut self,
        surface: &mut S,
        row: Row,
        percent: Option<f32>,
    ) -> Result<(), S::Error> {
        let layout = self.layout;
        let Some(cache) = self.cache.bar_mut(row) else {
            return Ok(());
        };

        let value = percent.map(clamp_percent);
        let width = value.map_or(0, |v| layout.bar_width(v));
        let shown = value.map_or(-1, round_non_negative);

        if cache.width == Some(width) && cache.shown == Some(shown) {
            return Ok(());
        }

        let track = layout.track(row);
        let touched = cache.width != Some(width);
        let previous = cache.width.unwrap_or(0);
        if width > previous {
            let grown = Rectangle::new(
                Point::new(track.top_left.x + previous as i32, track.top_left.y),
                Size::new(width - previous, track.size.height),
            );
            surface.fill_region(grown, bar_color(row))?;
        } else if width < previous {
            let shrunk = Rectangle::new(
                Point::new(track.top_left.x + width as i32, track.top_left.y),
                Size::new(previous - width, track.size.height),
            );
            surface.fill_region(shrunk, theme::TRACK)?;
        }
        cache.width = Some(width);

        // A bar that moved repaints its figure too, even if the number holds.
        if touched || cache.shown != Some(shown) {
            let mut text: String<8> = String::new();
            if shown < 0 {
                let _ = text.push_str(UNAVAILABLE);
            } else {
                let _ = write!(text, "{shown}%");
            }
            let style = TextStyle::new(TextSize::Large, theme::TEXT, theme::BACKGROUND)
                .right_aligned()
                .with_padding(PERCENT_LABEL_WIDTH_PX);
            surface.draw_text(&text, layout.value_anchor(row), style)?;
            cache.shown = Some(shown);
        }

        trace!("{} bar {} px, shows {}", row.label(), width, shown);
        Ok(())
    }

    fn update_temperature<S: Surface>(
        &mut self,
        surface: &mut S,
        row: Row,
        celsius: Option<f32>,
    ) -> Result<(), S::Error> {
        let layout = self.layout;
        let Some(cached) = self.cache.temperature_mut(row) else {
            return Ok(());
        };

        let tenths = temperature_tenths(celsius);
        if *cached == Some(tenths) {
            return Ok(());
        }

        let mut text: String<12> = String::new();
        match celsius {
            Some(value) => {
                let _ = write!(text, "{}C", round_non_negative(value));
            }
            None => {
                let _ = text.push_str(UNAVAILABLE);
            }
        }
        let style = TextStyle::new(TextSize::Large, theme::TEXT, theme::BACKGROUND)
            .right_aligned()
            .with_padding(TEMPERATURE_LABEL_WIDTH_PX);
        surface.draw_text(&text, layout.value_anchor(row), style)?;
        *cached = Some(tenths);
        Ok(())
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}
