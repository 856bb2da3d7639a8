//! Wired link over a UART.

use esp_hal::Blocking;
use esp_hal::uart::Uart;
use pcmon_core::transport::{ByteSource, LineSink, LinkError};

const RX_CHUNK: usize = 64;

/// Non-blocking byte source and line sink on top of a blocking UART.
///
/// Reads only take what already sits in the RX FIFO. Writes go straight to
/// the TX FIFO; an echo line is short enough that this never stalls the loop
/// for long.
pub struct SerialLink<'d> {
    uart: Uart<'d, Blocking>,
    rx: [u8; RX_CHUNK],
    rx_len: usize,
    rx_pos: usize,
}

impl<'d> SerialLink<'d> {
    pub fn new(uart: Uart<'d, Blocking>) -> Self {
        Self {
            uart,
            rx: [0; RX_CHUNK],
            rx_len: 0,
            rx_pos: 0,
        }
    }

    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), LinkError> {
        while !bytes.is_empty() {
            let written = self
                .uart
                .write(bytes)
                .map_err(|_| LinkError::WriteFailed)?;
            if written == 0 {
                return Err(LinkError::Busy);
            }
            bytes = &bytes[written..];
        }
        Ok(())
    }
}

impl ByteSource for SerialLink<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.rx_pos >= self.rx_len {
            let read = self.uart.read_buffered(&mut self.rx).ok()?;
            if read == 0 {
                return None;
            }
            self.rx_len = read;
            self.rx_pos = 0;
        }
        let byte = self.rx[self.rx_pos];
        self.rx_pos += 1;
        Some(byte)
    }
}

impl LineSink for SerialLink<'_> {
    fn is_connected(&self) -> bool {
        // A UART has no notion of a peer; the host may or may not listen.
        true
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.write_all(line.as_bytes())?;
        self.write_all(b"\n")
    }
}
