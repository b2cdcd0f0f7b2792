use std::sync::Arc;

use tracing::debug;

use scout_core::domain::{CompletionResult, ConversationTurn};

use crate::intent::Intent;
use crate::llm::{CompletionClient, CompletionRequest, UpstreamError};
use crate::profile::ProfileTable;

/// Routes a classified turn to its persona profile and issues exactly one
/// completion call. Holds no request state beyond the injected collaborator,
/// so concurrent dispatches never interact.
pub struct AgentDispatcher {
    profiles: ProfileTable,
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl AgentDispatcher {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self { profiles: ProfileTable::new(), client, model: model.into() }
    }

    /// Builds the completion request for `intent` and calls the upstream
    /// once. The generated text is returned verbatim; the LLM is trusted to
    /// only reference candidates it was given. On failure the upstream error
    /// propagates unchanged with no retry.
    pub async fn dispatch(
        &self,
        intent: Intent,
        turn: &ConversationTurn,
    ) -> Result<CompletionResult, UpstreamError> {
        let request = self.build_request(intent, turn);

        debug!(
            event_name = "agent.dispatch.request_built",
            intent = intent.as_str(),
            profile_id = self.profiles.for_intent(intent).id,
            candidate_count = turn.candidate_pool.len(),
            "dispatching completion request"
        );

        let text = self.client.complete(&request).await?;
        Ok(CompletionResult { text })
    }

    /// Deterministic request construction: same (intent, utterance, pool)
    /// always yields the same request. The candidate pool is appended as
    /// context only for the freelancer-matching profile.
    pub fn build_request(&self, intent: Intent, turn: &ConversationTurn) -> CompletionRequest {
        let profile = self.profiles.for_intent(intent);

        let user_content = match intent {
            Intent::FreelancerMatch => {
                let pool = serde_json::to_string(&turn.candidate_pool)
                    .unwrap_or_else(|_| "[]".to_string());
                format!("{}\nFreelancers: {pool}", turn.user_text)
            }
            Intent::Greeting | Intent::ProposalFlow => turn.user_text.clone(),
        };

        CompletionRequest {
            system_instruction: profile.persona.to_string(),
            user_content,
            model: self.model.clone(),
            temperature: profile.temperature,
        }
    }
}
