//! Ingestion worker and HTTP snapshot handlers, end to end without sockets.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::to_bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use tokio::sync::mpsc;

use carbon_registry_core::{MetricRecord, RawRecord};
use carbon_registry_server::app_state::AppState;
use carbon_registry_server::transport::http::{dump, metrics, DumpQuery};
use carbon_registry_server::{config, ingest};

fn state() -> AppState {
    AppState::new(config::load_from_str("version: 1\n").unwrap())
}

async fn body_string(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn ingest_lines(app: &AppState, lines: &[(&str, &str)]) {
    let (tx, rx) = mpsc::unbounded_channel();
    for (msg, reporter) in lines {
        tx.send(RawRecord::new(*msg, *reporter, Utc::now())).unwrap();
    }
    drop(tx);
    let stats = ingest::listen(app.ingestor(), rx).await.unwrap();
    assert_eq!(stats.received, lines.len() as u64);
}

#[tokio::test]
async fn listen_accounts_and_dump_is_sorted() {
    let app = state();
    ingest_lines(
        &app,
        &[
            ("zeta 1 1700000000", "web-1"),
            ("alpha 2 1700000000.5", ""),
            ("alpha notanumber 1700000000", "web-1"),
            ("   ", "web-1"),
            ("mid 3 -5.2", "web-2"),
        ],
    )
    .await;

    let store = app.store();
    assert_eq!(store.received(), 5);
    assert_eq!(store.errors(), 2);
    assert_eq!(store.stored(), 3);

    let resp = dump(State(app.clone()), Query(DumpQuery::default())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let records: Vec<MetricRecord> = serde_json::from_str(&body_string(resp).await).unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.metric.as_str()).collect();
    assert_eq!(names, ["alpha", "mid", "zeta"]);
    assert_eq!(records[0].source, "127.0.0.1");
    assert_eq!(records[0].timestamp, 1_700_000_001);
    assert_eq!(records[1].timestamp, 5);
}

#[tokio::test]
async fn plain_dump_and_unknown_format() {
    let app = state();
    ingest_lines(&app, &[("a 1 1", "h"), ("a 2 2", "h")]).await;

    let resp = dump(
        State(app.clone()),
        Query(DumpQuery {
            format: Some("plain".into()),
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let plain: std::collections::HashMap<String, MetricRecord> =
        serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(plain["a"].count, 2);
    assert_eq!(plain["a"].value, 2.0);

    let resp = dump(
        State(app.clone()),
        Query(DumpQuery {
            format: Some("yaml".into()),
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(resp).await.contains("BAD_REQUEST"));
}

#[tokio::test]
async fn listen_purges_before_consuming() {
    let app = state();
    app.store().receive("stale", "h", "d", 1.0, 1);
    app.store().mark_received();

    ingest_lines(&app, &[("fresh 1 1", "h")]).await;

    assert!(app.store().get("stale").is_none());
    assert_eq!(app.store().received(), 1);
}

#[tokio::test]
async fn metrics_page_reports_counters() {
    let app = state();
    ingest_lines(&app, &[("a 1 1", "h"), ("bad", "h")]).await;

    let body = body_string(metrics(State(app.clone())).await).await;
    assert!(body.contains("carbon_registry_metrics_received_total 2\n"), "{body}");
    assert!(body.contains("carbon_registry_metrics_errors_total 1\n"), "{body}");
    assert!(body.contains("carbon_registry_metrics_stored 1\n"), "{body}");
}
