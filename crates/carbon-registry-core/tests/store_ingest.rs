//! Store merge, dump ordering, and ingestion accounting.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};

use carbon_registry_core::{Ingestor, MetricRecord, MetricStore, RawRecord};

fn raw(message: &str, reporter: &str, secs: i64) -> RawRecord {
    RawRecord::new(message, reporter, Utc.timestamp_opt(secs, 0).unwrap())
}

fn pretty(store: &MetricStore) -> Vec<MetricRecord> {
    serde_json::from_str(&store.dump_pretty().unwrap()).unwrap()
}

#[test]
fn replay_keeps_last_observation_per_name() {
    let store = MetricStore::new();
    let submissions = [
        ("cpu", "h1", "d1", 1.0, 10),
        ("mem", "h1", "d1", 5.0, 10),
        ("cpu", "h2", "d2", 2.0, 20),
        ("disk", "h3", "d3", 9.0, 30),
        ("cpu", "h3", "d3", 3.0, 30),
        ("mem", "h2", "d4", 6.0, 40),
    ];
    for (m, s, d, v, t) in submissions {
        store.receive(m, s, d, v, t);
    }

    let mut expected: HashMap<&str, (MetricRecord, u64)> = HashMap::new();
    for (m, s, d, v, t) in submissions {
        let entry = expected.entry(m).or_insert_with(|| {
            (
                MetricRecord {
                    source: String::new(),
                    date: String::new(),
                    value: 0.0,
                    timestamp: 0,
                    metric: m.to_string(),
                    count: 0,
                },
                0,
            )
        });
        entry.0.source = s.to_string();
        entry.0.date = d.to_string();
        entry.0.value = v;
        entry.0.timestamp = t;
        entry.1 += 1;
        entry.0.count = entry.1;
    }

    assert_eq!(store.len(), expected.len());
    assert_eq!(store.stored(), expected.len() as u64);
    for (m, (rec, _)) in expected {
        assert_eq!(store.get(m).unwrap(), rec, "metric={m}");
    }
}

#[test]
fn pretty_dump_is_sorted_and_idempotent() {
    let store = MetricStore::new();
    for name in ["zeta", "Alpha", "alpha", "a.b", "a", "_x", "beta.2", "beta.10"] {
        store.receive(name, "h", "d", 1.0, 1);
    }

    let first = store.dump_pretty().unwrap();
    let second = store.dump_pretty().unwrap();
    assert_eq!(first, second);

    let names: Vec<String> = pretty(&store).into_iter().map(|r| r.metric).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.first().map(String::as_str), Some("Alpha"));
}

#[test]
fn purge_then_dump_is_empty() {
    let store = Arc::new(MetricStore::new());
    let ingestor = Ingestor::new(Arc::clone(&store));
    ingestor
        .drain(vec![raw("a 1 1", "h", 0), raw("bad", "h", 0)])
        .unwrap();
    assert_eq!(store.received(), 2);

    store.purge().unwrap();

    assert!(pretty(&store).is_empty());
    assert_eq!(store.dump_plain().unwrap(), "{}");
    assert_eq!((store.received(), store.errors(), store.stored()), (0, 0, 0));
}

#[test]
fn drain_accounts_every_record() {
    let store = Arc::new(MetricStore::new());
    let ingestor = Ingestor::new(Arc::clone(&store));

    let stats = ingestor
        .drain(vec![
            raw("cpu.load 0.73 1700000000", "web-1", 100),
            raw("cpu.load notanumber 1700000000", "web-1", 101),
            raw("", "web-1", 102),
            raw("cpu.load 0.75 NaN", "web-1", 103),
            raw("mem.used 12 1700000001", "", 104),
            raw("cpu.load 0.80 1700000002", "web-2", 105),
        ])
        .unwrap();

    assert_eq!(stats.received, 6);
    assert_eq!(stats.errors, 3);
    assert_eq!(stats.accepted(), 3);
    assert_eq!(store.received(), 6);
    assert_eq!(store.errors(), 3);
    assert_eq!(store.stored(), 2);

    let cpu = store.get("cpu.load").unwrap();
    assert_eq!(cpu.count, 2);
    assert_eq!(cpu.value, 0.80);
    assert_eq!(cpu.source, "web-2");
    assert_eq!(cpu.timestamp, 1_700_000_002);
    assert_eq!(cpu.date, Utc.timestamp_opt(105, 0).unwrap().to_string());

    let mem = store.get("mem.used").unwrap();
    assert_eq!(mem.source, "127.0.0.1");
}

#[test]
fn rejected_line_leaves_store_untouched() {
    let store = Arc::new(MetricStore::new());
    let ingestor = Ingestor::new(Arc::clone(&store));
    ingestor.start().unwrap();

    ingestor.ingest(&raw("cpu.load 0.73 1700000000", "web-1", 0)).unwrap();
    let before = store.dump_pretty().unwrap();

    let err = ingestor
        .ingest(&raw("cpu.load notanumber 1700000000", "web-1", 1))
        .unwrap_err();
    assert_eq!(err.kind().as_str(), "INVALID_VALUE");
    assert_eq!(store.dump_pretty().unwrap(), before);
    assert_eq!(store.received(), store.errors() + 1);
}

#[test]
fn drain_starts_from_a_clean_store() {
    let store = Arc::new(MetricStore::new());
    store.receive("stale", "h", "d", 1.0, 1);
    store.mark_received();

    let ingestor = Ingestor::new(Arc::clone(&store));
    ingestor.drain(vec![raw("fresh 1 1", "h", 0)]).unwrap();

    assert!(store.get("stale").is_none());
    assert_eq!(store.received(), 1);
    assert_eq!(store.stored(), 1);
}

#[test]
fn concurrent_dumps_never_see_mixed_records() {
    let store = Arc::new(MetricStore::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..5_000u64 {
                let metric = format!("m{}", i % 7);
                let tag = i.to_string();
                store.receive(&metric, &tag, &tag, i as f64, i);
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let plain: HashMap<String, MetricRecord> =
                        serde_json::from_str(&store.dump_plain().unwrap()).unwrap();
                    for rec in plain.values().chain(pretty(&store).iter()) {
                        let tag = rec.timestamp.to_string();
                        assert_eq!(rec.source, tag);
                        assert_eq!(rec.date, tag);
                        assert_eq!(rec.value, rec.timestamp as f64);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    let total: u64 = pretty(&store).iter().map(|r| r.count).sum();
    assert_eq!(total, 5_000);
}
