//! Byte-at-a-time line framing with a hard length ceiling.

use heapless::Vec;
use log::debug;

/// Longest accepted line, excluding the terminator and carriage returns.
pub const LINE_CAPACITY: usize = 128;

/// One complete, newline-free line.
pub type Line = Vec<u8, LINE_CAPACITY>;

/// Accumulates bytes from one link into complete lines.
///
/// A line is only ever handed out whole. If a line grows past
/// [`LINE_CAPACITY`] the pending bytes are thrown away and everything up to
/// and including the next `\n` is skipped, so the tail of a runaway line can
/// never be mistaken for a record.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Line,
    discarding: bool,
    overflows: u32,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
            overflows: 0,
        }
    }

    /// Feed one byte. Returns a line when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\n' => {
                if self.discarding {
                    self.discarding = false;
                    return None;
                }
                Some(core::mem::take(&mut self.buffer))
            }
            b'\r' => None,
            _ if self.discarding => None,
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.overflows = self.overflows.saturating_add(1);
                    debug!(
                        "Line exceeded {} bytes, discarding until newline",
                        LINE_CAPACITY
                    );
                    self.buffer.clear();
                    self.discarding = true;
                }
                None
            }
        }
    }

    /// Drop any partially assembled line.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Bytes currently waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Number of lines thrown away for being too long.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec as StdVec;

    fn feed(assembler: &mut LineAssembler, bytes: &[u8]) -> StdVec<Line> {
        bytes.iter().filter_map(|&b| assembler.push(b)).collect()
    }

    #[test]
    fn delivers_on_newline_and_resets() {
        let mut assembler = LineAssembler::new();
        let lines = feed(&mut assembler, b"12,3,4,5,6\n7,8");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_slice(), b"12,3,4,5,6");
        assert_eq!(assembler.pending(), 3);
    }

    #[test]
    fn carriage_returns_are_dropped_anywhere() {
        let mut assembler = LineAssembler::new();
        let lines = feed(&mut assembler, b"1,\r2,3,4,5\r\n");
        assert_eq!(lines[0].as_slice(), b"1,2,3,4,5");
    }

    #[test]
    fn line_without_newline_is_never_delivered() {
        let mut assembler = LineAssembler::new();
        let bytes = [b'7'; 200];
        assert!(feed(&mut assembler, &bytes).is_empty());
        assert_eq!(assembler.overflows(), 1);
    }

    #[test]
    fn overflow_discards_through_next_newline() {
        let mut assembler = LineAssembler::new();
        let mut bytes = StdVec::new();
        bytes.extend_from_slice(&[b'9'; 150]);
        bytes.extend_from_slice(b",1,2,3,4\n");
        bytes.extend_from_slice(b"10,20,30,40,50\n");

        let lines = feed(&mut assembler, &bytes);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_slice(), b"10,20,30,40,50");
    }

    #[test]
    fn exactly_capacity_is_accepted() {
        let mut assembler = LineAssembler::new();
        let mut bytes = StdVec::new();
        bytes.extend_from_slice(&[b'1'; LINE_CAPACITY]);
        bytes.push(b'\n');
        let lines = feed(&mut assembler, &bytes);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), LINE_CAPACITY);
        assert_eq!(assembler.overflows(), 0);
    }

    #[test]
    fn reset_drops_partial_line() {
        let mut assembler = LineAssembler::new();
        feed(&mut assembler, b"partial");
        assembler.reset();
        let lines = feed(&mut assembler, b"\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_empty());
    }
}
