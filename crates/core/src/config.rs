use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub completion: CompletionConfig,
    pub relay: RelayConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Credentials and parameters for the chat-completion upstream. The API key
/// is injected into the client at construction time; nothing reads it from
/// process-wide state after startup.
#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub completion_api_key: Option<String>,
    pub completion_base_url: Option<String>,
    pub completion_model: Option<String>,
    pub relay_enabled: Option<bool>,
    pub relay_base_url: Option<String>,
    pub relay_api_key: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            completion: CompletionConfig {
                api_key: String::new().into(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama3-70b-8192".to_string(),
                timeout_secs: 30,
            },
            relay: RelayConfig { enabled: false, base_url: None, api_key: None, timeout_secs: 15 },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("scout.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(completion) = patch.completion {
            if let Some(api_key_value) = completion.api_key {
                self.completion.api_key = secret_value(api_key_value);
            }
            if let Some(base_url) = completion.base_url {
                self.completion.base_url = base_url;
            }
            if let Some(model) = completion.model {
                self.completion.model = model;
            }
            if let Some(timeout_secs) = completion.timeout_secs {
                self.completion.timeout_secs = timeout_secs;
            }
        }

        if let Some(relay) = patch.relay {
            if let Some(enabled) = relay.enabled {
                self.relay.enabled = enabled;
            }
            if let Some(base_url) = relay.base_url {
                self.relay.base_url = Some(base_url);
            }
            if let Some(api_key_value) = relay.api_key {
                self.relay.api_key = Some(secret_value(api_key_value));
            }
            if let Some(timeout_secs) = relay.timeout_secs {
                self.relay.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SCOUT_COMPLETION_API_KEY") {
            self.completion.api_key = secret_value(value);
        }
        if let Some(value) = read_env("SCOUT_COMPLETION_BASE_URL") {
            self.completion.base_url = value;
        }
        if let Some(value) = read_env("SCOUT_COMPLETION_MODEL") {
            self.completion.model = value;
        }
        if let Some(value) = read_env("SCOUT_COMPLETION_TIMEOUT_SECS") {
            self.completion.timeout_secs = parse_u64("SCOUT_COMPLETION_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SCOUT_RELAY_ENABLED") {
            self.relay.enabled = parse_bool("SCOUT_RELAY_ENABLED", &value)?;
        }
        if let Some(value) = read_env("SCOUT_RELAY_BASE_URL") {
            self.relay.base_url = Some(value);
        }
        if let Some(value) = read_env("SCOUT_RELAY_API_KEY") {
            self.relay.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SCOUT_RELAY_TIMEOUT_SECS") {
            self.relay.timeout_secs = parse_u64("SCOUT_RELAY_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SCOUT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SCOUT_SERVER_PORT") {
            self.server.port = parse_u16("SCOUT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SCOUT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SCOUT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("SCOUT_LOGGING_LEVEL").or_else(|| read_env("SCOUT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("SCOUT_LOGGING_FORMAT").or_else(|| read_env("SCOUT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_key) = overrides.completion_api_key {
            self.completion.api_key = secret_value(api_key);
        }
        if let Some(base_url) = overrides.completion_base_url {
            self.completion.base_url = base_url;
        }
        if let Some(model) = overrides.completion_model {
            self.completion.model = model;
        }
        if let Some(enabled) = overrides.relay_enabled {
            self.relay.enabled = enabled;
        }
        if let Some(base_url) = overrides.relay_base_url {
            self.relay.base_url = Some(base_url);
        }
        if let Some(api_key) = overrides.relay_api_key {
            self.relay.api_key = Some(secret_value(api_key));
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_completion(&self.completion)?;
        validate_relay(&self.relay)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("scout.toml"), PathBuf::from("config/scout.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_completion(completion: &CompletionConfig) -> Result<(), ConfigError> {
    if completion.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "completion.api_key is required (set SCOUT_COMPLETION_API_KEY or [completion] api_key)"
                .to_string(),
        ));
    }

    let base_url = completion.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "completion.base_url must start with http:// or https://".to_string(),
        ));
    }

    if completion.model.trim().is_empty() {
        return Err(ConfigError::Validation("completion.model must not be empty".to_string()));
    }

    if completion.timeout_secs == 0 || completion.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "completion.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_relay(relay: &RelayConfig) -> Result<(), ConfigError> {
    if relay.timeout_secs == 0 || relay.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "relay.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if relay.enabled {
        let missing_url =
            relay.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
        if missing_url {
            return Err(ConfigError::Validation(
                "relay.enabled is true but relay.base_url is not set".to_string(),
            ));
        }

        let missing_key = relay
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing_key {
            return Err(ConfigError::Validation(
                "relay.enabled is true but relay.api_key is not set".to_string(),
            ));
        }
    }

    if let Some(base_url) = &relay.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "relay.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    completion: Option<CompletionPatch>,
    relay: Option<RelayPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RelayPatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
