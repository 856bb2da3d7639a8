//! Colour constants
//!
//! RGB565, 16-bit. To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::Rgb565;

/// Screen background and text background
pub const BACKGROUND: Rgb565 = Rgb565::new(0, 0, 0);

/// Empty bar track and the header separator
pub const TRACK: Rgb565 = Rgb565::new(128 >> 3, 128 >> 2, 128 >> 3);

/// Labels and values
pub const TEXT: Rgb565 = Rgb565::new(31, 63, 31);

pub const CPU_BAR: Rgb565 = Rgb565::new(0, 63, 0);
pub const RAM_BAR: Rgb565 = Rgb565::new(0, 63, 31);
pub const GPU_BAR: Rgb565 = Rgb565::new(255 >> 3, 180 >> 2, 0);

/// Status dot while records keep arriving
pub const FRESH: Rgb565 = Rgb565::new(0, 63, 0);

/// Status dot once the feed has gone quiet
pub const STALE: Rgb565 = Rgb565::new(31, 0, 0);

/// Secondary status text (wireless availability)
pub const ACCENT: Rgb565 = Rgb565::new(31, 63, 0);
