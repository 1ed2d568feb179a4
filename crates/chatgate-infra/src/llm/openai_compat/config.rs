//! Configuration and per-deployment defaults for the OpenAI-compatible provider.

use secrecy::SecretString;

/// Default OpenAI base URL when none is configured.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Which wire dialect the provider talks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// Plain OpenAI chat completions (`Authorization: Bearer`).
    OpenAi,
    /// Azure OpenAI (`api-key` header, deployment in the path, `api-version` query).
    Azure { api_version: String },
}

/// Configuration for an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "azure", "openai").
    pub provider_name: String,
    /// Azure endpoint or OpenAI-compatible base URL.
    pub base_url: String,
    pub api_key: SecretString,
    /// Model identifier, or Azure deployment name.
    pub model: String,
    pub dialect: Dialect,
}

impl OpenAiCompatConfig {
    /// Older Azure API versions reject `max_completion_tokens` and
    /// `stream_options`, so Azure requests use the legacy fields.
    pub fn uses_legacy_fields(&self) -> bool {
        matches!(self.dialect, Dialect::Azure { .. })
    }
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
        dialect: Dialect::OpenAi,
    }
}

/// Azure OpenAI configuration for one deployment.
pub fn azure_defaults(
    endpoint: &str,
    api_key: SecretString,
    deployment: &str,
    api_version: &str,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "azure".into(),
        base_url: endpoint.trim_end_matches('/').into(),
        api_key,
        model: deployment.into(),
        dialect: Dialect::Azure {
            api_version: api_version.into(),
        },
    }
}
