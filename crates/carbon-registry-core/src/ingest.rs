//! Synchronous ingestion driver: raw record -> parser -> store.
//!
//! The async server loop and tests both go through [`Ingestor::ingest`], so the
//! `received = errors + successful receives` accounting lives in one place.

use std::sync::Arc;

use crate::cache::MetricStore;
use crate::error::Result;
use crate::protocol::{parse_line, ParsedLine, RawRecord};

/// Per-run totals returned by [`Ingestor::drain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub received: u64,
    pub errors: u64,
}

impl IngestStats {
    pub fn accepted(&self) -> u64 {
        self.received - self.errors
    }
}

/// Drives raw records into a [`MetricStore`]. Intended to be the store's only writer.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<MetricStore>,
}

impl Ingestor {
    pub fn new(store: Arc<MetricStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    /// Reset the store before the first record. Callers must treat an error as fatal.
    pub fn start(&self) -> Result<()> {
        tracing::info!("start cache listener");
        self.store.purge()
    }

    /// Account, parse, and merge one raw record.
    ///
    /// Parse failures are counted and logged here and handed back so callers
    /// can add their own accounting; the record is dropped either way.
    pub fn ingest(&self, raw: &RawRecord) -> Result<ParsedLine> {
        self.store.mark_received();

        let parsed = match parse_line(raw) {
            Ok(p) => p,
            Err(e) => {
                self.store.mark_error();
                tracing::warn!(
                    line = %raw.message,
                    source = %raw.source(),
                    code = e.kind().as_str(),
                    "could not parse message: {e}"
                );
                return Err(e);
            }
        };

        self.store.receive(
            &parsed.metric,
            &parsed.source,
            &raw.date(),
            parsed.value,
            parsed.timestamp,
        );
        Ok(parsed)
    }

    /// `start`, then ingest every record until the sequence ends.
    pub fn drain<I>(&self, records: I) -> Result<IngestStats>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        self.start()?;

        let mut stats = IngestStats::default();
        for raw in records {
            stats.received += 1;
            if self.ingest(&raw).is_err() {
                stats.errors += 1;
            }
        }
        Ok(stats)
    }
}
