//! Telemetry echo
//!
//! Every accepted record is re-serialized in a human readable keyed form and
//! pushed out of the link opposite to the one it came in on. The echo is
//! strictly best effort: a link that is not connected is skipped, a failed
//! write is counted and forgotten, and nothing is ever retried or looped
//! back into a parser.

use core::fmt::Write;

use heapless::String;
use log::debug;

use crate::metrics::Metrics;
use crate::transport::LineSink;

/// Room for five keyed fields even with absurdly large values.
pub const ECHO_CAPACITY: usize = 256;

/// Serialize metrics as `CPU:..,TEMP:..,RAM:..,GPU:..,G-TEMP:..`.
///
/// Returns `None` only if the text does not fit in [`ECHO_CAPACITY`].
pub fn format_echo(metrics: &Metrics) -> Option<String<ECHO_CAPACITY>> {
    let mut line = String::new();
    write!(
        line,
        "CPU:{:.2},TEMP:{:.2},RAM:{:.2},GPU:{:.2},G-TEMP:{:.2}",
        metrics.cpu, metrics.temp_c, metrics.ram, metrics.gpu, metrics.gpu_temp_c
    )
    .ok()?;
    Some(line)
}

/// Result of one relay attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoOutcome {
    Sent,
    /// Target link absent or not connected.
    Skipped,
    /// The link refused the write.
    Failed,
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoStats {
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[derive(Debug, Default)]
pub struct Echo {
    stats: EchoStats,
}

impl Echo {
    pub const fn new() -> Self {
        Self {
            stats: EchoStats {
                sent: 0,
                skipped: 0,
                failed: 0,
            },
        }
    }

    /// Push `metrics` out of `sink` if it is usable. Never blocks or retries.
    pub fn relay<L: LineSink + ?Sized>(&mut self, metrics: &Metrics, sink: &mut L) -> EchoOutcome {
        if !sink.is_connected() {
            self.stats.skipped = self.stats.skipped.saturating_add(1);
            return EchoOutcome::Skipped;
        }

        let outcome = match format_echo(metrics) {
            Some(line) => match sink.write_line(&line) {
                Ok(()) => EchoOutcome::Sent,
                Err(e) => {
                    debug!("Echo dropped: {}", e);
                    EchoOutcome::Failed
                }
            },
            None => EchoOutcome::Failed,
        };

        match outcome {
            EchoOutcome::Sent => self.stats.sent = self.stats.sent.saturating_add(1),
            _ => self.stats.failed = self.stats.failed.saturating_add(1),
        }
        outcome
    }

    pub fn stats(&self) -> EchoStats {
        self.stats
    }
}
