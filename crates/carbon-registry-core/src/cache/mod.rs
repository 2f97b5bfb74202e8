//! Latest-value metric cache.
//!
//! `store` owns the name -> record map and the aggregate counters; `dump`
//! renders point-in-time JSON snapshots of it.

mod dump;
mod record;
mod store;

pub use record::MetricRecord;
pub use store::{CounterSnapshot, MetricStore};
