//! Line-oriented telemetry wire protocol.
//!
//! ```text
//! <cpu_pct>,<temp_c>,<ram_pct>,<gpu_pct>,<gpu_temp_c>\n
//! ```
//!
//! Bytes are framed into lines by [`LineAssembler`] (one per link) and each
//! complete line is turned into [`Metrics`](crate::Metrics) by
//! [`parse_record`].

pub mod line;
pub mod record;

pub use line::{LINE_CAPACITY, Line, LineAssembler};
pub use record::{RecordError, parse_line, parse_record};
