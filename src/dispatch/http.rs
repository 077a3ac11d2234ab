//! HTTP transport for the dispatcher. Maps HTTP requests to method calls.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /:method`: dispatch a method. Body = JSON argument bag. A missing
//!   or unparseable body counts as no arguments, so the method reports which
//!   one is missing.
//! - `GET /health`: health check returning `{ "ok": true, "methods": [...] }`.
//!
//! Responses carry the serialized [`MethodResponse`]: 200 on success, the
//! error's status code on failure, 501 for unknown methods.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reward_ads::{dispatch, Dispatcher, RewardAds};
//!
//! let dispatcher = Arc::new(Dispatcher::reward_ads(Arc::new(RewardAds::new(factory))));
//!
//! // Get the router to compose with other axum routes
//! let app = dispatch::router(dispatcher.clone());
//!
//! // Or serve directly
//! dispatch::serve(dispatcher, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::debug;

use super::service::{Dispatcher, MethodResponse};

/// Build an axum `Router` that dispatches method calls via `dispatcher`.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/:method", post(method_handler))
        .with_state(dispatcher)
}

/// Serve the dispatcher over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(dispatcher: Arc<Dispatcher>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// `GET /health`: returns `{ "ok": true, "methods": [...] }`.
async fn health_handler(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    let mut methods = dispatcher.methods();
    methods.sort_unstable();
    Json(json!({ "ok": true, "methods": methods }))
}

/// `POST /:method`: dispatch with the JSON body as the argument bag.
async fn method_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(method): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let args = parse_args(&method, &body);
    let result = dispatcher.dispatch(&method, args);
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };
    (status, Json(MethodResponse::from_result(result)))
}

/// The argument bag from a request body; empty or malformed bodies are null.
fn parse_args(method: &str, body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(method, error = %e, "unparseable request body");
        Value::Null
    })
}
