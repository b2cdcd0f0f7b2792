use std::sync::Arc;

use scout_agent::dispatch::AgentDispatcher;
use scout_agent::llm::{HttpCompletionClient, UpstreamError};
use scout_core::config::{AppConfig, ConfigError, LoadOptions};
use scout_relay::{ProposalRelay, RelayError, SupabaseRelay};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("completion client construction failed: {0}")]
    CompletionClient(#[source] UpstreamError),
    #[error("proposal relay construction failed: {0}")]
    Relay(#[source] RelayError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Assembles the shared router state from an already validated config.
/// Credentials flow from the config into the clients here, at construction
/// time; nothing reads process-wide state afterwards.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let completion_client =
        HttpCompletionClient::new(&config.completion).map_err(BootstrapError::CompletionClient)?;
    let model = config.completion.model.clone();
    let dispatcher = Arc::new(AgentDispatcher::new(Arc::new(completion_client), model));
    info!(
        event_name = "system.bootstrap.completion_client_ready",
        correlation_id = "bootstrap",
        model = %config.completion.model,
        "completion client constructed"
    );

    let relay: Option<Arc<dyn ProposalRelay>> = if config.relay.enabled {
        let relay = SupabaseRelay::new(&config.relay).map_err(BootstrapError::Relay)?;
        info!(
            event_name = "system.bootstrap.relay_ready",
            correlation_id = "bootstrap",
            "proposal relay constructed"
        );
        Some(Arc::new(relay))
    } else {
        info!(
            event_name = "system.bootstrap.relay_disabled",
            correlation_id = "bootstrap",
            "proposal relay disabled by configuration"
        );
        None
    };

    let state = AppState { dispatcher, relay, completion_model: config.completion.model.clone() };

    Ok(Application { config, state })
}
