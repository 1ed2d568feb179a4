//! Completion provider implementations.
//!
//! Contains the concrete [`LlmProvider`](chatgate_core::llm::provider::LlmProvider)
//! implementation for Azure OpenAI and OpenAI, a factory ([`create_provider`])
//! that builds it from [`ProviderSettings`], a connectivity check
//! ([`test_provider_connection`]), and the [`unavailable::UnavailableProvider`]
//! used when nothing could be configured.

pub mod openai_compat;
pub mod unavailable;

use secrecy::{ExposeSecret, SecretString};

use chatgate_core::llm::box_provider::BoxLlmProvider;
use chatgate_types::config::ProviderSettings;
use chatgate_types::llm::{CompletionRequest, LlmError, Message, MessageRole, ProviderKind};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OPENAI_BASE_URL, azure_defaults, openai_defaults};

/// Create a [`BoxLlmProvider`] from [`ProviderSettings`].
///
/// # Errors
///
/// Returns `LlmError::NotConfigured` if the API key is missing, or if an
/// Azure provider has no endpoint.
pub fn create_provider(
    settings: &ProviderSettings,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let api_key = api_key
        .filter(|key| !key.expose_secret().is_empty())
        .ok_or_else(|| {
            LlmError::NotConfigured(format!("API key variable {} is not set", settings.api_key_env))
        })?;

    let config = match settings.kind {
        ProviderKind::Azure => {
            if settings.base_url.trim().is_empty() {
                return Err(LlmError::NotConfigured(
                    "Azure OpenAI endpoint is not set (provider.base_url or AZURE_OPENAI_ENDPOINT)"
                        .to_string(),
                ));
            }
            azure_defaults(
                &settings.base_url,
                api_key,
                &settings.model,
                &settings.api_version,
            )
        }
        ProviderKind::OpenAi => {
            let mut config = openai_defaults(api_key, &settings.model);
            if !settings.base_url.trim().is_empty() && settings.base_url != OPENAI_BASE_URL {
                config.base_url = settings.base_url.clone();
            }
            config
        }
    };

    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)))
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Sends a tiny "Hello" message with a 10-token budget.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(), // Provider uses its configured default
        messages: vec![Message {
            role: MessageRole::User,
            content: "Hello".to_string(),
        }],
        system: None,
        max_tokens: 10,
        temperature: Some(0.0),
        stream: false,
    };
    provider.complete(&request).await?;
    Ok(())
}
