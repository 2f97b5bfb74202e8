//! Axum router wiring.
//!
//! - `GET /v1/dump[?format=pretty|plain]`: cache snapshot
//! - `GET /metrics`: cache + transport counters

use axum::{routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/dump", get(transport::http::dump))
        .route("/metrics", get(transport::http::metrics))
        .with_state(state)
}
