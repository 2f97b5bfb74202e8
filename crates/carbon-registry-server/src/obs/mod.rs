//! Lightweight in-process counters.
//!
//! Cache and transport counters are stored as atomics and rendered in
//! Prometheus text format by the `/metrics` handler.

pub mod metrics;
