//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that exercises the storage backend

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

use crate::services::backend::SharedBackend;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK. Performs no work.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that runs a cheap `list_buckets` call against the
/// backend. Returns 200 when the check passes, 503 otherwise.
pub async fn readyz(State(backend): State<SharedBackend>) -> impl IntoResponse {
    let backend_check = match backend.list_buckets() {
        Ok(_) => (true, None::<String>),
        Err(err) => (false, Some(err.to_string())),
    };

    let ok = backend_check.0;
    let mut checks = HashMap::new();
    checks.insert(
        "backend",
        CheckStatus {
            ok,
            error: backend_check.1,
        },
    );

    let body = ReadyResponse {
        status: if ok { "ok".into() } else { "error".into() },
        checks,
    };
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
