//! Drawing surface used by the render engine and status row.

use core::fmt::Debug;

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

/// Text size variants
///
/// - `Medium`: 6x10 font, status row
/// - `Large`: 10x20 font, title, labels and values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Medium,
    Large,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Medium => &embedded_graphics::mono_font::ascii::FONT_6X10,
            TextSize::Large => &embedded_graphics::mono_font::ascii::FONT_10X20,
        }
    }

    pub fn char_width(&self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }

    pub fn line_height(&self) -> u32 {
        self.font().character_size.height
    }

    /// Width of `text` in pixels, one glyph per char.
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// How a string is drawn.
///
/// `padding_width` reserves a box of that many pixels around the text and
/// paints the part the glyphs don't cover with `background`, so a shorter
/// value fully replaces a longer one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: TextSize,
    pub color: Rgb565,
    pub background: Rgb565,
    pub align: TextAlign,
    pub padding_width: u32,
}

impl TextStyle {
    pub const fn new(size: TextSize, color: Rgb565, background: Rgb565) -> Self {
        Self {
            size,
            color,
            background,
            align: TextAlign::Left,
            padding_width: 0,
        }
    }

    pub const fn right_aligned(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }

    pub const fn with_padding(mut self, width: u32) -> Self {
        self.padding_width = width;
        self
    }
}

/// The drawing primitives the monitor needs from a panel.
pub trait Surface {
    type Error: Debug;

    fn fill_region(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error>;

    fn fill_circle(&mut self, center: Point, radius: u32, color: Rgb565)
    -> Result<(), Self::Error>;

    /// Draw `text` with its top edge at `anchor.y`. For right-aligned text
    /// `anchor.x` is the right edge.
    fn draw_text(&mut self, text: &str, anchor: Point, style: TextStyle)
    -> Result<(), Self::Error>;

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error>;
}

impl<T: Surface + ?Sized> Surface for &mut T {
    type Error = T::Error;

    fn fill_region(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        (**self).fill_region(area, color)
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), Self::Error> {
        (**self).fill_circle(center, radius, color)
    }

    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: TextStyle,
    ) -> Result<(), Self::Error> {
        (**self).draw_text(text, anchor, style)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        (**self).set_backlight(on)
    }
}

/// Switches the panel backlight.
pub trait Backlight {
    fn set_enabled(&mut self, on: bool);
}

/// For panels whose backlight is hard-wired on.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBacklight;

impl Backlight for NoBacklight {
    fn set_enabled(&mut self, _on: bool) {}
}

/// [`Surface`] over any RGB565 embedded-graphics target.
pub struct GraphicsSurface<D, B = NoBacklight> {
    target: D,
    backlight: B,
}

impl<D> GraphicsSurface<D, NoBacklight> {
    pub fn new(target: D) -> Self {
        Self {
            target,
            backlight: NoBacklight,
        }
    }
}

impl<D, B> GraphicsSurface<D, B> {
    pub fn with_backlight(target: D, backlight: B) -> Self {
        Self { target, backlight }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn backlight_mut(&mut self) -> &mut B {
        &mut self.backlight
    }
}

impl<D, B> Surface for GraphicsSurface<D, B>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
    B: Backlight,
{
    type Error = D::Error;

    fn fill_region(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        self.target.fill_solid(&area, color)
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), Self::Error> {
        Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.target)
    }

    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: TextStyle,
    ) -> Result<(), Self::Error> {
        let text_width = style.size.text_width(text);

        if style.padding_width > text_width {
            let spare = style.padding_width - text_width;
            let spare_x = match style.align {
                TextAlign::Left => anchor.x + text_width as i32,
                TextAlign::Right => anchor.x - style.padding_width as i32,
            };
            let spare_area = Rectangle::new(
                Point::new(spare_x, anchor.y),
                Size::new(spare, style.size.line_height()),
            );
            self.target.fill_solid(&spare_area, style.background)?;
        }

        let character_style = MonoTextStyleBuilder::new()
            .font(style.size.font())
            .text_color(style.color)
            .background_color(style.background)
            .build();
        let alignment = match style.align {
            TextAlign::Left => Alignment::Left,
            TextAlign::Right => Alignment::Right,
        };
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Top)
            .build();

        Text::with_text_style(text, anchor, character_style, text_style).draw(&mut self.target)?;
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight.set_enabled(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::FrameBuffer;

    const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
    const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
    const RED: Rgb565 = Rgb565::new(31, 0, 0);

    #[test]
    fn fill_region_paints_exactly_the_rectangle() {
        let mut surface = GraphicsSurface::new(FrameBuffer::new(Size::new(40, 20)));
        surface
            .fill_region(Rectangle::new(Point::new(5, 5), Size::new(10, 3)), RED)
            .unwrap();

        let fb = surface.target();
        assert_eq!(fb.pixel(Point::new(5, 5)), Some(RED));
        assert_eq!(fb.pixel(Point::new(14, 7)), Some(RED));
        assert_eq!(fb.pixel(Point::new(15, 7)), Some(BLACK));
        assert_eq!(fb.pixel(Point::new(5, 8)), Some(BLACK));
    }

    #[test]
    fn padding_clears_what_a_longer_string_left_behind() {
        let mut surface = GraphicsSurface::new(FrameBuffer::new(Size::new(120, 30)));
        let style = TextStyle::new(TextSize::Large, WHITE, BLACK).with_padding(60);

        // Stain the whole padding box first.
        surface
            .fill_region(Rectangle::new(Point::new(0, 0), Size::new(60, 20)), RED)
            .unwrap();
        surface.draw_text("1%", Point::new(0, 0), style).unwrap();

        let fb = surface.target();
        for x in 20..60 {
            assert_eq!(fb.pixel(Point::new(x, 10)), Some(BLACK), "x = {x}");
        }
    }

    #[test]
    fn text_width_counts_glyphs() {
        assert_eq!(TextSize::Large.text_width("100%"), 40);
        assert_eq!(TextSize::Medium.text_width("RX: fresh"), 54);
    }

    #[test]
    fn backlight_is_forwarded() {
        struct Flag(bool);
        impl Backlight for Flag {
            fn set_enabled(&mut self, on: bool) {
                self.0 = on;
            }
        }

        let mut surface =
            GraphicsSurface::with_backlight(FrameBuffer::new(Size::new(4, 4)), Flag(true));
        surface.set_backlight(false).unwrap();
        assert!(!surface.backlight_mut().0);
    }
}
