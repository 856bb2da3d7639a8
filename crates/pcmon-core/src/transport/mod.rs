//! Transport traits
//!
//! A link is anything that can hand out received bytes without blocking and
//! optionally accept a line for transmission. The wired link is usually a
//! UART or USB serial port; the wireless link is fed through a
//! [`PacketSlot`] by whatever radio stack the board runs.

mod packet;

pub use packet::{
    PACKET_CAPACITY, Packet, PacketChannel, PacketError, PacketLink, PacketSlot, PacketSource,
};

use thiserror_no_std::Error;

/// Which of the two links something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Wired,
    Wireless,
}

impl LinkKind {
    /// The link an echo of a record from `self` goes out on.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Wired => Self::Wireless,
            Self::Wireless => Self::Wired,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("link is not connected")]
    NotConnected,
    #[error("transmit buffer is full")]
    Busy,
    #[error("line does not fit the transmit buffer")]
    TooLong,
    #[error("write failed")]
    WriteFailed,
}

/// Non-blocking byte input.
pub trait ByteSource {
    /// Next received byte, or `None` if nothing is available right now.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Best-effort line output.
pub trait LineSink {
    fn is_connected(&self) -> bool;

    /// Transmit one line. The implementation adds whatever terminator the
    /// transport needs.
    fn write_line(&mut self, line: &str) -> Result<(), LinkError>;
}

/// A duplex link, the unit the monitor multiplexes over.
pub trait Link: ByteSource + LineSink {}

impl<T: ByteSource + LineSink> Link for T {}

/// Stand-in for a link the board does not have.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLink;

impl ByteSource for NoLink {
    fn read_byte(&mut self) -> Option<u8> {
        None
    }
}

impl LineSink for NoLink {
    fn is_connected(&self) -> bool {
        false
    }

    fn write_line(&mut self, _line: &str) -> Result<(), LinkError> {
        Err(LinkError::NotConnected)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        (**self).write_line(line)
    }
}
