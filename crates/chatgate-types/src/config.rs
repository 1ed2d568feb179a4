//! Gateway configuration types for chatgate.
//!
//! `GatewayConfig` represents the top-level `config.toml` that controls
//! session lifetime, chat defaults, CORS, and the completion provider.

use serde::{Deserialize, Serialize};

use crate::chat::{DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::llm::ProviderKind;
use crate::session::DEFAULT_SESSION_TTL_MINUTES;

/// Top-level configuration for the gateway.
///
/// Loaded from `~/.chatgate/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Lifetime of issued session tokens, in minutes.
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,

    /// Language the default system prompt asks the assistant to answer in.
    #[serde(default = "default_response_language")]
    pub response_language: String,

    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    /// Number of exchanges returned by a history listing.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Origins allowed by the CORS layer.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Ensure the `testAI` demo user exists at startup.
    #[serde(default)]
    pub seed_test_user: bool,

    #[serde(default)]
    pub provider: ProviderSettings,
}

fn default_session_ttl_minutes() -> i64 {
    DEFAULT_SESSION_TTL_MINUTES
}

fn default_response_language() -> String {
    "Japanese".to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_history_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: default_session_ttl_minutes(),
            response_language: default_response_language(),
            default_max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
            history_limit: default_history_limit(),
            cors_allowed_origins: default_cors_allowed_origins(),
            seed_test_user: false,
            provider: ProviderSettings::default(),
        }
    }
}

/// Completion provider settings.
///
/// The API key itself never lives in the config file; `api_key_env` names
/// the environment variable that holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,

    /// Azure endpoint, or base URL of an OpenAI-compatible API.
    #[serde(default)]
    pub base_url: String,

    /// Model name, or Azure deployment name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Azure API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_provider_kind() -> ProviderKind {
    ProviderKind::Azure
}

fn default_model() -> String {
    "gpt-35-turbo".to_string()
}

fn default_api_version() -> String {
    "2023-12-01-preview".to_string()
}

fn default_api_key_env() -> String {
    "AZURE_OPENAI_API_KEY".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            base_url: String::new(),
            model: default_model(),
            api_version: default_api_version(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_default_values() {
        let config = GatewayConfig::default();
        assert_eq!(config.session_ttl_minutes, 30);
        assert_eq!(config.default_max_tokens, 1000);
        assert!((config.default_temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert!(!config.seed_test_user);
        assert_eq!(config.provider.kind, ProviderKind::Azure);
        assert_eq!(config.provider.api_key_env, "AZURE_OPENAI_API_KEY");
    }

    #[test]
    fn test_gateway_config_partial_toml() {
        let toml_str = r#"
session_ttl_minutes = 60
response_language = "English"

[provider]
kind = "openai"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"
"#;
        let config: GatewayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session_ttl_minutes, 60);
        assert_eq!(config.response_language, "English");
        assert_eq!(config.default_max_tokens, 1000);
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.api_version, "2023-12-01-preview");
    }

    #[test]
    fn test_gateway_config_empty_toml() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.response_language, "Japanese");
        assert_eq!(config.provider.model, "gpt-35-turbo");
    }
}
