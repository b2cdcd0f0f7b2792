//! Proposal Relay - single-write delivery of confirmed proposals
//!
//! This crate covers the one outbound persistence integration scout has: an
//! append-only message store (a Supabase REST table) that carries proposal
//! text from a client to a freelancer. The relay is deliberately not wired
//! into the conversational dispatcher; it is a separate capability the HTTP
//! boundary exposes, triggered once a human confirms the send.
//!
//! # Key Types
//!
//! - `ProposalRelay` - trait over the message-store collaborator
//! - `SupabaseRelay` - reqwest-backed REST implementation
//! - `RelayError` - failure taxonomy for the single write (no retry)

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use scout_core::config::RelayConfig;

/// Acknowledgement of a delivered proposal. `record` is the stored row as
/// returned by the message store, passed through for the caller to display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelayAck {
    pub delivered: bool,
    pub record: serde_json::Value,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("relay is not configured")]
    NotConfigured,
    #[error("relay transport failed: {0}")]
    Transport(String),
    #[error("relay write timed out")]
    Timeout,
    #[error("relay upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("relay response was malformed: {0}")]
    MalformedResponse(String),
}

/// The append-only message store collaborator. One synchronous write per
/// call, keyed by sender and recipient identifiers.
#[async_trait]
pub trait ProposalRelay: Send + Sync {
    async fn relay(&self, from: &str, to: &str, text: &str) -> Result<RelayAck, RelayError>;
}

#[derive(Serialize)]
struct MessageRow<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

/// Reqwest-backed relay against the Supabase REST surface: a single POST to
/// `/rest/v1/messages` with the anon key as both `apikey` and bearer token.
pub struct SupabaseRelay {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl SupabaseRelay {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let base_url = config
            .base_url
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(RelayError::NotConfigured)?;
        let api_key = config.api_key.as_ref().ok_or(RelayError::NotConfigured)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| RelayError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/messages", self.base_url)
    }
}

#[async_trait]
impl ProposalRelay for SupabaseRelay {
    async fn relay(&self, from: &str, to: &str, text: &str) -> Result<RelayAck, RelayError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .header("Prefer", "return=representation")
            .json(&MessageRow { from, to, text })
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    RelayError::Timeout
                } else {
                    RelayError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status { status: status.as_u16(), body });
        }

        let record = response
            .json::<serde_json::Value>()
            .await
            .map_err(|error| RelayError::MalformedResponse(error.to_string()))?;

        info!(
            event_name = "relay.proposal.delivered",
            from = %from,
            to = %to,
            "proposal relayed to message store"
        );

        Ok(RelayAck { delivered: true, record })
    }
}
