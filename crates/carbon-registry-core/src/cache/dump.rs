//! JSON snapshots of the store.
//!
//! Both dumps copy under the read lock and encode after releasing it, so the
//! ingestion writer is only held up for the copy.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{RegistryError, Result};

use super::record::MetricRecord;
use super::store::MetricStore;

const PRETTY_INDENT: &[u8] = b"    ";

impl MetricStore {
    /// All records sorted by metric name (byte order), as an indented JSON array.
    pub fn dump_pretty(&self) -> Result<String> {
        let mut records: Vec<MetricRecord> = self.read_records()?.values().cloned().collect();
        records.sort_by(|a, b| a.metric.cmp(&b.metric));

        let mut buf = Vec::with_capacity(records.len() * 160);
        let formatter = PrettyFormatter::with_indent(PRETTY_INDENT);
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| RegistryError::SerializationFailed(e.to_string()))
    }

    /// The raw `metric -> record` object, compact, in map order.
    pub fn dump_plain(&self) -> Result<String> {
        let records = self.read_records()?.clone();
        Ok(serde_json::to_string(&records)?)
    }
}
