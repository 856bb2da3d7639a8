//! Screen geometry
//!
//! The layout is computed once from the panel size. Rows sit on a fixed
//! pitch below the header; bar rows have a track between the label column
//! and a right-aligned value column.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::surface::TextSize;

/// Panel width in landscape orientation
pub const SCREEN_WIDTH_PX: u32 = 320;

/// Panel height in landscape orientation
pub const SCREEN_HEIGHT_PX: u32 = 240;

const PADDING_PX: i32 = 8;

/// Wide enough for the longest label, "G-TEMP:", in the large font
const LABEL_WIDTH_PX: i32 = 70;
const LABEL_GAP_PX: i32 = 6;
const VALUE_GAP_PX: i32 = 6;

const HEADER_HEIGHT_PX: i32 = 28;
const ROW_PITCH_PX: i32 = 32;
pub const BAR_HEIGHT_PX: u32 = 22;

/// Padding box for "100%" and "N/A" in the large font
pub const PERCENT_LABEL_WIDTH_PX: u32 = 44;

/// Padding box for temperature values such as "105C"
pub const TEMPERATURE_LABEL_WIDTH_PX: u32 = 64;

const STATUS_ROW_HEIGHT_PX: u32 = 28;
pub const STATUS_DOT_RADIUS_PX: u32 = 5;

/// One line of the metrics table, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Cpu,
    Ram,
    Gpu,
    GpuTemp,
    Temp,
}

impl Row {
    pub const ALL: [Row; 5] = [Row::Cpu, Row::Ram, Row::Gpu, Row::GpuTemp, Row::Temp];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU:",
            Self::Ram => "RAM:",
            Self::Gpu => "GPU:",
            Self::GpuTemp => "G-TEMP:",
            Self::Temp => "TEMP:",
        }
    }

    pub const fn has_bar(self) -> bool {
        matches!(self, Self::Cpu | Self::Ram | Self::Gpu)
    }

    const fn index(self) -> i32 {
        match self {
            Self::Cpu => 0,
            Self::Ram => 1,
            Self::Gpu => 2,
            Self::GpuTemp => 3,
            Self::Temp => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub screen: Size,
    pub padding: i32,
    pub track_x: i32,
    pub track_width: u32,
    pub bar_height: u32,
    pub first_row_y: i32,
    pub row_pitch: i32,
    /// Right edge of the value column
    pub value_right: i32,
}

impl Default for Layout {
    fn default() -> Self {
        Self::for_screen(Size::new(SCREEN_WIDTH_PX, SCREEN_HEIGHT_PX))
    }
}

impl Layout {
    pub const fn for_screen(screen: Size) -> Self {
        let track_x = PADDING_PX + LABEL_WIDTH_PX + LABEL_GAP_PX;
        let value_right = screen.width as i32 - PADDING_PX;
        let track_end = value_right - PERCENT_LABEL_WIDTH_PX as i32 - VALUE_GAP_PX;
        let track_width = if track_end > track_x {
            (track_end - track_x) as u32
        } else {
            0
        };

        Self {
            screen,
            padding: PADDING_PX,
            track_x,
            track_width,
            bar_height: BAR_HEIGHT_PX,
            first_row_y: PADDING_PX + HEADER_HEIGHT_PX,
            row_pitch: ROW_PITCH_PX,
            value_right,
        }
    }

    pub fn screen_area(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.screen)
    }

    pub fn title_anchor(&self) -> Point {
        Point::new(self.padding, self.padding)
    }

    /// One pixel high rule under the title.
    pub fn separator(&self) -> Rectangle {
        let width = self.screen.width.saturating_sub(2 * self.padding as u32);
        Rectangle::new(
            Point::new(self.padding, self.padding + 20),
            Size::new(width, 1),
        )
    }

    pub fn row_y(&self, row: Row) -> i32 {
        self.first_row_y + row.index() * self.row_pitch
    }

    /// Top-left of the large-font text vertically centred in a row.
    fn text_y(&self, row: Row) -> i32 {
        let text_height = TextSize::Large.line_height();
        self.row_y(row) + (self.bar_height.saturating_sub(text_height) / 2) as i32
    }

    pub fn label_anchor(&self, row: Row) -> Point {
        Point::new(self.padding, self.text_y(row))
    }

    /// Right-aligned anchor of the value column.
    pub fn value_anchor(&self, row: Row) -> Point {
        Point::new(self.value_right, self.text_y(row))
    }

    pub fn track(&self, row: Row) -> Rectangle {
        Rectangle::new(
            Point::new(self.track_x, self.row_y(row)),
            Size::new(self.track_width, self.bar_height),
        )
    }

    /// Filled width for a percentage already clamped to `0..=100`.
    pub fn bar_width(&self, percent: f32) -> u32 {
        let width = (self.track_width as f32 * percent / 100.0) as u32;
        width.min(self.track_width)
    }

    fn status_y(&self) -> i32 {
        self.screen.height as i32 - STATUS_ROW_HEIGHT_PX as i32
    }

    /// Whole status row, cleared on every redraw.
    pub fn status_area(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.padding, self.status_y() - 4),
            Size::new(
                self.screen.width.saturating_sub(2 * self.padding as u32),
                STATUS_ROW_HEIGHT_PX,
            ),
        )
    }

    pub fn status_dot(&self) -> Point {
        Point::new(self.padding + 6, self.status_y() + 6)
    }

    pub fn status_text_anchor(&self) -> Point {
        Point::new(self.padding + 18, self.status_y())
    }

    pub fn status_right_anchor(&self) -> Point {
        Point::new(self.screen.width as i32 - self.padding, self.status_y())
    }
}
