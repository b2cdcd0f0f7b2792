use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub completion: HealthCheck,
    pub relay: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Readiness is configuration-based: scout holds no storage and probing the
/// completion upstream would spend a billable call, so the check reports what
/// was wired at bootstrap.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let relay = if state.relay.is_some() {
        HealthCheck { status: "ready", detail: "proposal relay configured".to_string() }
    } else {
        HealthCheck { status: "disabled", detail: "proposal relay not configured".to_string() }
    };

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "scout-server runtime initialized".to_string(),
        },
        completion: HealthCheck {
            status: "ready",
            detail: format!("completion model {}", state.completion_model),
        },
        relay,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
