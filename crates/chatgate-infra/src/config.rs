//! Gateway configuration loader for chatgate.
//!
//! Reads `config.toml` from the data directory (`~/.chatgate/` in production)
//! and deserializes it into [`GatewayConfig`]. Falls back to defaults when the
//! file is missing or malformed. Also resolves the provider environment
//! fallbacks and the token signing secret.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use chatgate_types::config::{GatewayConfig, ProviderSettings};

use crate::crypto::token::generate_signing_secret;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CHATGATE_DATA_DIR";

/// Environment variable holding the token signing secret.
pub const SECRET_KEY_ENV: &str = "CHATGATE_SECRET_KEY";

/// Resolve the data directory: `CHATGATE_DATA_DIR`, else `~/.chatgate`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chatgate")
}

/// Load gateway configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GatewayConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_gateway_config(data_dir: &Path) -> GatewayConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GatewayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GatewayConfig::default();
        }
    };

    match toml::from_str::<GatewayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GatewayConfig::default()
        }
    }
}

/// Fill empty provider settings from the Azure OpenAI environment variables
/// (`AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_VERSION`,
/// `AZURE_OPENAI_MODEL_NAME`). Values from the config file win.
pub fn apply_provider_env(
    settings: &ProviderSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> ProviderSettings {
    let mut resolved = settings.clone();
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if resolved.base_url.trim().is_empty() {
        if let Some(endpoint) = non_empty("AZURE_OPENAI_ENDPOINT") {
            resolved.base_url = endpoint;
        }
    }
    if let Some(version) = non_empty("AZURE_OPENAI_API_VERSION") {
        if settings.api_version == ProviderSettings::default().api_version {
            resolved.api_version = version;
        }
    }
    if let Some(model) = non_empty("AZURE_OPENAI_MODEL_NAME") {
        if settings.model == ProviderSettings::default().model {
            resolved.model = model;
        }
    }
    resolved
}

/// Read the provider API key from the environment variable named in settings.
pub fn resolve_api_key(settings: &ProviderSettings) -> Option<SecretString> {
    std::env::var(&settings.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}

/// Where the signing secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Environment,
    Generated,
}

/// Resolve the token signing secret: `CHATGATE_SECRET_KEY`, else a fresh
/// random secret for this process.
pub fn resolve_signing_secret(env_value: Option<String>) -> (SecretString, SecretSource) {
    match env_value.filter(|v| !v.is_empty()) {
        Some(value) => (SecretString::from(value), SecretSource::Environment),
        None => (generate_signing_secret(), SecretSource::Generated),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn load_gateway_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_gateway_config(tmp.path()).await;
        assert_eq!(config.session_ttl_minutes, 30);
        assert_eq!(config.history_limit, 50);
    }

    #[tokio::test]
    async fn load_gateway_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
session_ttl_minutes = 15
seed_test_user = true
cors_allowed_origins = ["https://chat.example.com"]

[provider]
kind = "azure"
base_url = "https://example.openai.azure.com"
model = "gpt-4o"
"#,
        )
        .await
        .unwrap();

        let config = load_gateway_config(tmp.path()).await;
        assert_eq!(config.session_ttl_minutes, 15);
        assert!(config.seed_test_user);
        assert_eq!(config.cors_allowed_origins, vec!["https://chat.example.com"]);
        assert_eq!(config.provider.base_url, "https://example.openai.azure.com");
        assert_eq!(config.provider.model, "gpt-4o");
    }

    #[tokio::test]
    async fn load_gateway_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_gateway_config(tmp.path()).await;
        assert_eq!(config.session_ttl_minutes, 30);
    }

    #[test]
    fn apply_provider_env_fills_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AZURE_OPENAI_ENDPOINT", "https://env.openai.azure.com"),
            ("AZURE_OPENAI_API_VERSION", "2024-06-01"),
            ("AZURE_OPENAI_MODEL_NAME", "gpt-4o-mini"),
        ]);
        let resolved = apply_provider_env(&ProviderSettings::default(), |k| {
            env.get(k).map(|v| v.to_string())
        });
        assert_eq!(resolved.base_url, "https://env.openai.azure.com");
        assert_eq!(resolved.api_version, "2024-06-01");
        assert_eq!(resolved.model, "gpt-4o-mini");
    }

    #[test]
    fn apply_provider_env_keeps_configured_values() {
        let settings = ProviderSettings {
            base_url: "https://file.openai.azure.com".to_string(),
            model: "from-file".to_string(),
            ..ProviderSettings::default()
        };
        let resolved = apply_provider_env(&settings, |k| match k {
            "AZURE_OPENAI_ENDPOINT" => Some("https://env.openai.azure.com".to_string()),
            "AZURE_OPENAI_MODEL_NAME" => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(resolved.base_url, "https://file.openai.azure.com");
        assert_eq!(resolved.model, "from-file");
    }

    #[test]
    fn resolve_signing_secret_prefers_environment() {
        let (secret, source) = resolve_signing_secret(Some("from-env".to_string()));
        assert_eq!(secret.expose_secret(), "from-env");
        assert_eq!(source, SecretSource::Environment);

        let (_, source) = resolve_signing_secret(Some(String::new()));
        assert_eq!(source, SecretSource::Generated);
        let (_, source) = resolve_signing_secret(None);
        assert_eq!(source, SecretSource::Generated);
    }

    #[test]
    fn resolve_data_dir_ends_with_chatgate_or_override() {
        let dir = resolve_data_dir();
        assert!(std::env::var(DATA_DIR_ENV).is_ok() || dir.ends_with(".chatgate"));
    }
}
