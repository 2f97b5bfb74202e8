//! HTTP handlers for cache snapshots and counters.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DumpQuery {
    #[serde(default)]
    pub format: Option<String>,
}

fn error_json(code: &str, msg: &str) -> String {
    json!({
        "code": code,
        "msg": msg
    })
    .to_string()
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Pretty (sorted) dump by default, plain (unordered, compact) on request.
pub async fn dump(State(app): State<AppState>, Query(q): Query<DumpQuery>) -> Response {
    let res = match q.format.as_deref() {
        None | Some("pretty") => app.store().dump_pretty(),
        Some("plain") => app.store().dump_plain(),
        Some(other) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                error_json("BAD_REQUEST", &format!("unknown dump format: {other}")),
            );
        }
    };

    match res {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(code = e.kind().as_str(), "dump failed: {e}");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_json(e.kind().as_str(), &e.to_string()),
            )
        }
    }
}

pub async fn metrics(State(app): State<AppState>) -> Response {
    let body = app.metrics().render(&app.store().counters());
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response()
}
