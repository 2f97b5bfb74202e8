//! Shared application state for the registry server.
//!
//! One `MetricStore` is shared by the ingestion worker (sole writer) and the
//! HTTP handlers (snapshot readers).

use std::sync::Arc;

use carbon_registry_core::{Ingestor, MetricStore};

use crate::config::RegistryConfig;
use crate::obs::metrics::TransportMetrics;

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<RegistryConfig>,
    store: Arc<MetricStore>,
    metrics: Arc<TransportMetrics>,
}

impl AppState {
    pub fn new(cfg: RegistryConfig) -> Self {
        Self {
            cfg: Arc::new(cfg),
            store: Arc::new(MetricStore::new()),
            metrics: Arc::new(TransportMetrics::default()),
        }
    }

    pub fn cfg(&self) -> &RegistryConfig {
        &self.cfg
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn metrics(&self) -> Arc<TransportMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Writer handle for the ingestion worker. Create exactly one.
    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(Arc::clone(&self.store))
    }
}
