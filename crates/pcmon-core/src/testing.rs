//! Fakes for the collaborator traits, shared by unit tests.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::Clock;
use crate::display::{Surface, TextStyle};
use crate::transport::{ByteSource, LineSink, LinkError};

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Fill {
        area: Rectangle,
        color: Rgb565,
    },
    Circle {
        center: Point,
        radius: u32,
        color: Rgb565,
    },
    Text {
        text: String,
        anchor: Point,
        style: TextStyle,
    },
    Backlight(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFault;

/// Surface that logs every drawing call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<Op>,
    backlight: bool,
    failing: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with [`SurfaceFault`] (and is still recorded).
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<Op> {
        core::mem::take(&mut self.ops)
    }

    pub fn fills(&self) -> Vec<(Rectangle, Rgb565)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill { area, color } => Some((*area, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    fn record(&mut self, op: Op) -> Result<(), SurfaceFault> {
        self.ops.push(op);
        if self.failing { Err(SurfaceFault) } else { Ok(()) }
    }
}

impl Surface for RecordingSurface {
    type Error = SurfaceFault;

    fn fill_region(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        self.record(Op::Fill { area, color })
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), Self::Error> {
        self.record(Op::Circle {
            center,
            radius,
            color,
        })
    }

    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: TextStyle,
    ) -> Result<(), Self::Error> {
        self.record(Op::Text {
            text: text.to_string(),
            anchor,
            style,
        })
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight = on;
        self.record(Op::Backlight(on))
    }
}

/// Clock moved by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Link fed from a byte queue that records what is written to it.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    input: VecDeque<u8>,
    sent: Vec<String>,
    connected: bool,
    failure: Option<LinkError>,
    write_attempts: usize,
}

impl ScriptedLink {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Every write fails with `error`.
    pub fn failing_with(mut self, error: LinkError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Lines successfully written, without terminators.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts
    }
}

impl ByteSource for ScriptedLink {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}

impl LineSink for ScriptedLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.write_attempts += 1;
        if let Some(error) = self.failure {
            return Err(error);
        }
        self.sent.push(line.to_string());
        Ok(())
    }
}
