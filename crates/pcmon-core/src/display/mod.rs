//! Everything that puts pixels on the panel.
//!
//! The render engine and status row talk to a [`Surface`], a small drawing
//! interface that maps directly onto what a TFT driver offers. Boards and the
//! simulator get one for free by wrapping an embedded-graphics `DrawTarget`
//! in a [`GraphicsSurface`].

pub mod framebuffer;
pub mod layout;
pub mod render;
pub mod status;
pub mod surface;
pub mod theme;

pub use framebuffer::FrameBuffer;
pub use layout::{Layout, Row, SCREEN_HEIGHT_PX, SCREEN_WIDTH_PX};
pub use render::{BarCache, DrawCache, RenderEngine};
pub use status::{StatusIndicator, WirelessStatus};
pub use surface::{Backlight, GraphicsSurface, NoBacklight, Surface, TextAlign, TextSize, TextStyle};
