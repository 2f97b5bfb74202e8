//! carbon-registry server library entry.
//!
//! This crate wires the syslog transport, the ingestion worker, and the HTTP
//! snapshot surface around the core metric store. It is consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ingest;
pub mod obs;
pub mod router;
pub mod transport;
