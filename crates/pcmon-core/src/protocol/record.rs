//! Record parsing
//!
//! Parsing is positional and deliberately lenient: the only hard failure is
//! a record with fewer than five fields. A field that is not a number reads
//! as zero instead of rejecting the record, and a `KEY:value` field reads as
//! its value so echoed lines parse like plain ones.

use thiserror_no_std::Error;

use crate::metrics::Metrics;

/// Number of commas separating the five fields.
const FIELD_SEPARATORS: usize = 4;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 5 comma separated fields, found {found}")]
    MissingFields { found: usize },
}

/// Parse a framed line as delivered by the [`LineAssembler`](super::LineAssembler).
///
/// Only the first four commas split; anything after the fourth belongs to
/// the last field (and is then ignored by the numeric prefix rule). Bytes
/// that are not UTF-8 end a field's text, they never reject the record.
pub fn parse_line(line: &[u8]) -> Result<Metrics, RecordError> {
    let line = line.trim_ascii();
    let separators = line.iter().filter(|&&b| b == b',').count();
    if separators < FIELD_SEPARATORS {
        return Err(RecordError::MissingFields {
            found: if line.is_empty() { 0 } else { separators + 1 },
        });
    }

    let mut fields = line
        .splitn(FIELD_SEPARATORS + 1, |&b| b == b',')
        .map(field_value);
    let mut next = || fields.next().unwrap_or(0.0);

    Ok(Metrics {
        cpu: next(),
        temp_c: next(),
        ram: next(),
        gpu: next(),
        gpu_temp_c: next(),
    })
}

/// Parse `cpu,temp,ram,gpu,gpu_temp`.
pub fn parse_record(record: &str) -> Result<Metrics, RecordError> {
    parse_line(record.as_bytes())
}

/// Numeric value of one field, `0.0` when there is none.
fn field_value(field: &[u8]) -> f32 {
    let text = match core::str::from_utf8(field) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&field[..e.valid_up_to()]).unwrap_or_default(),
    };
    let value = match text.rfind(':') {
        Some(idx) => &text[idx + 1..],
        None => text,
    };
    leading_number(value.trim())
}

/// Parse the longest `[+-]digits[.digits]` prefix of `text`.
fn leading_number(text: &str) -> f32 {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > digits_start;

    if bytes.get(end) == Some(&b'.') {
        let mut frac_end = end + 1;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        } else if has_digits {
            end += 1;
        }
    }

    if !has_digits {
        return 0.0;
    }
    text[..end].parse().unwrap_or(0.0)
}
