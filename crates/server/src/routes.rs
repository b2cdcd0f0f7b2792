//! HTTP routes for the conversational boundary.
//!
//! - `POST /scout`            — classify a prompt and return the agent reply
//! - `GET  /scout`            — static introduction message
//! - `POST /api/v1/proposals` — relay a confirmed proposal to the message store
//!
//! The proposal route is intentionally not triggered by the scout flow
//! itself: delivery of a proposal is an external write, so it stays behind an
//! explicit, human-confirmed call.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use scout_agent::dispatch::AgentDispatcher;
use scout_agent::intent::classify;
use scout_core::domain::{Candidate, ConversationTurn};
use scout_core::errors::{ApplicationError, InterfaceError};
use scout_relay::ProposalRelay;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<AgentDispatcher>,
    pub relay: Option<Arc<dyn ProposalRelay>>,
    pub completion_model: String,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScoutRequest {
    pub prompt: String,
    #[serde(default)]
    pub freelancers: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
pub struct ScoutResponse {
    #[serde(rename = "agentMessage")]
    pub agent_message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProposalRequest {
    pub from: String,
    pub to: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub success: bool,
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scout", post(scout).get(scout_intro))
        .route("/api/v1/proposals", post(send_proposal))
        .with_state(state)
}

fn interface_reply(error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ApiError {
        error: error.user_message().to_string(),
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(body))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn scout(
    State(state): State<AppState>,
    Json(request): Json<ScoutRequest>,
) -> Result<Json<ScoutResponse>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().to_string();
    let turn = ConversationTurn::new(request.prompt, request.freelancers);
    let intent = classify(&turn.user_text);

    info!(
        event_name = "ingress.scout.request_received",
        correlation_id = %correlation_id,
        intent = intent.as_str(),
        candidate_count = turn.candidate_pool.len(),
        "scout request received"
    );

    match state.dispatcher.dispatch(intent, &turn).await {
        Ok(result) => {
            info!(
                event_name = "ingress.scout.reply_sent",
                correlation_id = %correlation_id,
                intent = intent.as_str(),
                "scout reply sent"
            );
            Ok(Json(ScoutResponse { agent_message: result.text }))
        }
        Err(error) => {
            warn!(
                event_name = "ingress.scout.upstream_failed",
                correlation_id = %correlation_id,
                intent = intent.as_str(),
                error = %error,
                "completion upstream failed"
            );
            let interface =
                ApplicationError::Upstream(error.to_string()).into_interface(correlation_id);
            Err(interface_reply(interface))
        }
    }
}

pub async fn scout_intro() -> Json<ScoutResponse> {
    Json(ScoutResponse {
        agent_message: "Hi! I'm Scout, your AI assistant. Ask me to find the best freelancers \
                        for your needs!"
            .to_string(),
    })
}

pub async fn send_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<ProposalResponse>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    let missing_field = request.from.trim().is_empty()
        || request.to.trim().is_empty()
        || request.text.trim().is_empty();
    if missing_field {
        let interface = InterfaceError::BadRequest {
            message: "missing required fields: from, to, text".to_string(),
            correlation_id,
        };
        return Err(interface_reply(interface));
    }

    let Some(relay) = state.relay.as_ref() else {
        warn!(
            event_name = "ingress.proposal.relay_unconfigured",
            correlation_id = %correlation_id,
            "proposal request received but relay is not configured"
        );
        let interface = ApplicationError::Relay("relay is not configured".to_string())
            .into_interface(correlation_id);
        return Err(interface_reply(interface));
    };

    info!(
        event_name = "ingress.proposal.request_received",
        correlation_id = %correlation_id,
        from = %request.from,
        to = %request.to,
        "proposal request received"
    );

    match relay.relay(&request.from, &request.to, &request.text).await {
        Ok(ack) => Ok(Json(ProposalResponse { success: ack.delivered, data: ack.record })),
        Err(error) => {
            warn!(
                event_name = "ingress.proposal.relay_failed",
                correlation_id = %correlation_id,
                error = %error,
                "proposal relay failed"
            );
            let interface =
                ApplicationError::Relay(error.to_string()).into_interface(correlation_id);
            Err(interface_reply(interface))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;

    use scout_agent::dispatch::AgentDispatcher;
    use scout_agent::llm::{CompletionClient, CompletionRequest, UpstreamError};
    use scout_relay::{ProposalRelay, RelayAck, RelayError};

    use super::{
        scout, scout_intro, send_proposal, AppState, ProposalRequest, ScoutRequest,
    };

    #[derive(Default)]
    struct ScriptedClient {
        state: Mutex<ScriptedState>,
    }

    #[derive(Default)]
    struct ScriptedState {
        results: VecDeque<Result<String, UpstreamError>>,
        requests: Vec<CompletionRequest>,
    }

    impl ScriptedClient {
        fn with_results(results: Vec<Result<String, UpstreamError>>) -> Self {
            Self {
                state: Mutex::new(ScriptedState { results: results.into(), requests: Vec::new() }),
            }
        }

        fn call_count(&self) -> usize {
            self.state.lock().expect("state lock").requests.len()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
            let mut state = self.state.lock().expect("state lock");
            state.requests.push(request.clone());
            state.results.pop_front().unwrap_or_else(|| Ok("ok".to_string()))
        }
    }

    struct ScriptedRelay {
        result: Mutex<Option<Result<RelayAck, RelayError>>>,
    }

    #[async_trait]
    impl ProposalRelay for ScriptedRelay {
        async fn relay(&self, _from: &str, _to: &str, _text: &str) -> Result<RelayAck, RelayError> {
            self.result
                .lock()
                .expect("result lock")
                .take()
                .unwrap_or_else(|| Ok(RelayAck { delivered: true, record: serde_json::json!([]) }))
        }
    }

    fn state_with(client: Arc<ScriptedClient>, relay: Option<Arc<dyn ProposalRelay>>) -> AppState {
        AppState {
            dispatcher: Arc::new(AgentDispatcher::new(client, "llama3-70b-8192")),
            relay,
            completion_model: "llama3-70b-8192".to_string(),
        }
    }

    #[tokio::test]
    async fn scout_returns_agent_message_on_success() {
        let client =
            Arc::new(ScriptedClient::with_results(vec![Ok("You're welcome!".to_string())]));
        let state = state_with(client, None);

        let Json(response) = scout(
            State(state),
            Json(ScoutRequest { prompt: "thanks".to_string(), freelancers: vec![] }),
        )
        .await
        .expect("scout should succeed");

        assert_eq!(response.agent_message, "You're welcome!");
    }

    #[tokio::test]
    async fn scout_maps_upstream_timeout_to_service_unavailable() {
        let client = Arc::new(ScriptedClient::with_results(vec![Err(UpstreamError::Timeout)]));
        let state = state_with(client.clone(), None);

        let (status, Json(body)) = scout(
            State(state),
            Json(ScoutRequest { prompt: "find a developer".to_string(), freelancers: vec![] }),
        )
        .await
        .expect_err("scout should fail");

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body.error,
            "Sorry, I couldn't process your request right now. Please try again later."
        );
        assert!(!body.correlation_id.is_empty());
        assert_eq!(client.call_count(), 1, "exactly one upstream call, no retry");
    }

    #[tokio::test]
    async fn scout_intro_returns_static_greeting() {
        let Json(response) = scout_intro().await;
        assert!(response.agent_message.starts_with("Hi! I'm Scout"));
    }

    #[tokio::test]
    async fn proposal_with_missing_fields_is_bad_request() {
        let state = state_with(Arc::new(ScriptedClient::default()), None);

        let (status, Json(body)) = send_proposal(
            State(state),
            Json(ProposalRequest {
                from: "0xclient".to_string(),
                to: "".to_string(),
                text: "hello".to_string(),
            }),
        )
        .await
        .expect_err("proposal should fail");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "The request could not be processed. Check inputs and try again.");
    }

    #[tokio::test]
    async fn proposal_without_relay_is_service_unavailable() {
        let state = state_with(Arc::new(ScriptedClient::default()), None);

        let (status, _) = send_proposal(
            State(state),
            Json(ProposalRequest {
                from: "0xclient".to_string(),
                to: "0xfreelancer".to_string(),
                text: "Project Proposal: build a site".to_string(),
            }),
        )
        .await
        .expect_err("proposal should fail without relay");

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn proposal_returns_stored_record_on_success() {
        let record = serde_json::json!([{"from": "0xclient", "to": "0xfreelancer"}]);
        let relay = Arc::new(ScriptedRelay {
            result: Mutex::new(Some(Ok(RelayAck { delivered: true, record: record.clone() }))),
        });
        let state = state_with(Arc::new(ScriptedClient::default()), Some(relay));

        let Json(response) = send_proposal(
            State(state),
            Json(ProposalRequest {
                from: "0xclient".to_string(),
                to: "0xfreelancer".to_string(),
                text: "Project Proposal: build a site".to_string(),
            }),
        )
        .await
        .expect("proposal should succeed");

        assert!(response.success);
        assert_eq!(response.data, record);
    }

    #[tokio::test]
    async fn proposal_relay_failure_is_service_unavailable() {
        let relay = Arc::new(ScriptedRelay {
            result: Mutex::new(Some(Err(RelayError::Status {
                status: 500,
                body: "storage offline".to_string(),
            }))),
        });
        let state = state_with(Arc::new(ScriptedClient::default()), Some(relay));

        let (status, Json(body)) = send_proposal(
            State(state),
            Json(ProposalRequest {
                from: "0xclient".to_string(),
                to: "0xfreelancer".to_string(),
                text: "Project Proposal: build a site".to_string(),
            }),
        )
        .await
        .expect_err("proposal should fail");

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.contains("storage offline"), "internal detail must not leak");
    }
}
