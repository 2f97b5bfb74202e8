//! Ingestion worker: drains the transport queue into the store.
//!
//! Single consumer, sole writer. Malformed lines are counted, logged by the
//! `Ingestor`, and dropped; they never stop the loop.

use tokio::sync::mpsc;

use carbon_registry_core::error::Result;
use carbon_registry_core::{IngestStats, Ingestor, RawRecord};

/// Purge, then ingest until every sender is dropped.
///
/// A purge failure is returned before anything is consumed; callers must stop
/// the process, since counters would no longer match the store.
pub async fn listen(
    ingestor: Ingestor,
    mut rx: mpsc::UnboundedReceiver<RawRecord>,
) -> Result<IngestStats> {
    ingestor.start()?;

    let mut stats = IngestStats::default();
    while let Some(raw) = rx.recv().await {
        stats.received += 1;
        if ingestor.ingest(&raw).is_err() {
            stats.errors += 1;
        }
    }

    tracing::info!(
        received = stats.received,
        errors = stats.errors,
        "ingestion queue closed"
    );
    Ok(stats)
}
