//! Counter rendering for the `/metrics` page.
//!
//! Cache counters come from the store as a `CounterSnapshot`; transport
//! counters are labelled `CounterVec`s backed by `DashMap`. Labels are flattened
//! into sorted key vectors to keep deterministic ordering.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use carbon_registry_core::CounterSnapshot;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Sorted owned label pairs, so label order at the call site does not matter.
fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        let counter = self.map.entry(label_key(labels)).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for one label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format, series sorted by labels.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let label_str = r
                    .key()
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                (label_str, r.value().load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();
        for (label_str, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str, val);
        }
    }
}

/// Counters owned by the syslog transport.
#[derive(Default)]
pub struct TransportMetrics {
    pub datagrams: CounterVec,
    pub recv_errors: CounterVec,
    pub decode_errors: CounterVec,
}

impl TransportMetrics {
    /// Render cache counters followed by transport counters.
    pub fn render(&self, cache: &CounterSnapshot) -> String {
        let mut out = String::new();
        let plain = [
            ("carbon_registry_metrics_received_total", "counter", cache.received),
            ("carbon_registry_metrics_errors_total", "counter", cache.errors),
            ("carbon_registry_metrics_stored", "gauge", cache.stored),
            ("carbon_registry_flush_total", "counter", cache.flush_count),
            ("carbon_registry_flush_errors_total", "counter", cache.flush_errors),
        ];
        for (name, kind, v) in plain {
            let _ = writeln!(out, "# TYPE {name} {kind}\n{name} {v}");
        }

        self.datagrams.render("carbon_registry_syslog_datagrams_total", &mut out);
        self.recv_errors.render("carbon_registry_syslog_recv_errors_total", &mut out);
        self.decode_errors.render("carbon_registry_syslog_decode_errors_total", &mut out);
        out
    }
}
