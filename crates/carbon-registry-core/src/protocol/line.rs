//! Metric line parsing (panic-free).
//!
//! A line is `<metric> <value> <timestamp> [ignored...]`, fields separated by
//! whitespace. Transport metadata (reporter identity, receive time) travels
//! beside the line in [`RawRecord`].
//!
//! Parsing rules:
//! - Never index fields directly — walk the iterator.
//! - Non-finite values and timestamps are rejected, not clamped.
//! - Numbers are decimal only (`f64::from_str`); hex floats like `0x1p3` are
//!   rejected.

use chrono::{DateTime, Utc};

use crate::error::{RegistryError, Result};

/// Reporter used when the transport hands over an empty identity
/// (the relay's own internal metrics arrive this way).
pub const LOOPBACK_SOURCE: &str = "127.0.0.1";

/// One raw delivery from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Free-text metric line.
    pub message: String,
    /// Reporter identity (hostname or address). May be empty.
    pub reporter: String,
    /// When the transport received the record.
    pub received_at: DateTime<Utc>,
}

impl RawRecord {
    pub fn new(
        message: impl Into<String>,
        reporter: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            reporter: reporter.into(),
            received_at,
        }
    }

    /// Reporter identity with the loopback fallback applied.
    pub fn source(&self) -> &str {
        if self.reporter.is_empty() {
            LOOPBACK_SOURCE
        } else {
            &self.reporter
        }
    }

    /// Human-readable receive time, as stored in `MetricRecord::date`.
    pub fn date(&self) -> String {
        self.received_at.to_string()
    }
}

/// A validated metric observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub metric: String,
    pub value: f64,
    pub timestamp: u64,
    /// Reporter after the loopback fallback.
    pub source: String,
}

/// Parse one raw record into a validated observation.
pub fn parse_line(raw: &RawRecord) -> Result<ParsedLine> {
    let source = raw.source();
    let mut fields = raw.message.split_whitespace();

    let metric = fields.next().ok_or_else(|| RegistryError::EmptyMessage {
        source_host: source.to_string(),
    })?;

    let value = fields
        .next()
        .ok_or_else(|| "missing value field".to_string())
        .and_then(parse_finite)
        .map_err(|reason| RegistryError::InvalidValue {
            message: raw.message.clone(),
            source_host: source.to_string(),
            reason,
        })?;

    let timestamp = fields
        .next()
        .ok_or_else(|| "missing timestamp field".to_string())
        .and_then(parse_finite)
        .map(to_epoch_seconds)
        .map_err(|reason| RegistryError::InvalidTimestamp {
            message: raw.message.clone(),
            source_host: source.to_string(),
            reason,
        })?;

    Ok(ParsedLine {
        metric: metric.to_string(),
        value,
        timestamp,
        source: source.to_string(),
    })
}

fn parse_finite(field: &str) -> std::result::Result<f64, String> {
    let v: f64 = field.parse().map_err(|e| format!("'{field}': {e}"))?;
    if !v.is_finite() {
        return Err(format!("'{field}' is not a finite number"));
    }
    Ok(v)
}

/// `|round(x)|`, half away from zero. `as` saturates above `u64::MAX`.
fn to_epoch_seconds(ts: f64) -> u64 {
    ts.abs().round() as u64
}
