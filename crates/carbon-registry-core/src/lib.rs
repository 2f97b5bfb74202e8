//! carbon-registry core: line parsing, the latest-value metric store, snapshot
//! dumps, and the synchronous ingestion driver.
//!
//! This crate carries no transport or async runtime dependencies so the cache
//! can be fed from any delivery channel (UDP receiver, tests, replay tools).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed lines surface as `RegistryError` values and are counted, never
//! allowed to crash the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cache;
pub mod error;
pub mod ingest;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorKind, RegistryError, Result};

pub use cache::{CounterSnapshot, MetricRecord, MetricStore};
pub use ingest::{IngestStats, Ingestor};
pub use protocol::{parse_line, ParsedLine, RawRecord};
