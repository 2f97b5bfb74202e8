use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use serde::Serialize;

use crate::error::{RegistryError, Result};

use super::record::MetricRecord;

type RecordMap = HashMap<String, MetricRecord>;

/// Point-in-time copy of the aggregate counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub received: u64,
    pub errors: u64,
    pub stored: u64,
    pub flush_count: u64,
    pub flush_errors: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    errors: AtomicU64,
    stored: AtomicU64,
    flush_count: AtomicU64,
    flush_errors: AtomicU64,
}

/// Latest-value metric store.
///
/// - `metric -> MetricRecord`, last write wins per name.
/// - One writer (the ingestion worker) plus any number of snapshot readers.
/// - Record updates happen under the write lock, so readers only ever see
///   whole records.
/// - `purge` takes the write lock too, so it never interleaves with a snapshot
///   copy.
#[derive(Default)]
pub struct MetricStore {
    records: RwLock<RecordMap>,
    counters: Counters,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one validated observation. No validation happens here.
    pub fn receive(&self, metric: &str, source: &str, date: &str, value: f64, timestamp: u64) {
        tracing::debug!(%metric, value, timestamp, %source, %date, "receive");

        // Every mutation is a plain field store, so a poisoned lock still
        // guards a consistent map.
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        match records.get_mut(metric) {
            Some(record) => record.observe(source, date, value, timestamp),
            None => {
                records.insert(
                    metric.to_string(),
                    MetricRecord::first(metric, source, date, value, timestamp),
                );
                self.counters.stored.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Drop every record and zero `received`, `stored`, `errors`.
    /// Flush counters belong to the flush collaborator and are left alone.
    pub fn purge(&self) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RegistryError::PurgeFailed("store lock poisoned".into()))?;
        *records = HashMap::new();
        self.counters.received.store(0, Ordering::Relaxed);
        self.counters.stored.store(0, Ordering::Relaxed);
        self.counters.errors.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Copy of one record, if present.
    pub fn get(&self, metric: &str) -> Option<MetricRecord> {
        self.read_records().ok()?.get(metric).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_records().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- counters

    pub fn received(&self) -> u64 {
        self.counters.received.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.counters.errors.load(Ordering::Relaxed)
    }

    /// Distinct metric names inserted since the last purge.
    pub fn stored(&self) -> u64 {
        self.counters.stored.load(Ordering::Relaxed)
    }

    pub fn flush_count(&self) -> u64 {
        self.counters.flush_count.load(Ordering::Relaxed)
    }

    pub fn flush_errors(&self) -> u64 {
        self.counters.flush_errors.load(Ordering::Relaxed)
    }

    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            received: self.received(),
            errors: self.errors(),
            stored: self.stored(),
            flush_count: self.flush_count(),
            flush_errors: self.flush_errors(),
        }
    }

    /// One raw record pulled from the transport, valid or not.
    pub fn mark_received(&self) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
    }

    /// One raw record rejected by the parser.
    pub fn mark_error(&self) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// For a downstream flush/export collaborator; the cache never calls this.
    pub fn mark_flush(&self) {
        self.counters.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    /// For a downstream flush/export collaborator; the cache never calls this.
    pub fn mark_flush_error(&self) {
        self.counters.flush_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn read_records(&self) -> Result<RwLockReadGuard<'_, RecordMap>> {
        self.records
            .read()
            .map_err(|_| RegistryError::SerializationFailed("store lock poisoned".into()))
    }

    #[cfg(test)]
    pub(super) fn write_records(&self) -> std::sync::RwLockWriteGuard<'_, RecordMap> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}
