//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/hasher/codec traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use secrecy::SecretString;
use tracing::{info, warn};

use chatgate_core::auth::authenticator::Authenticator;
use chatgate_core::auth::guard::SessionGuard;
use chatgate_core::auth::users::UserService;
use chatgate_core::chat::prompt::default_system_prompt;
use chatgate_core::chat::service::{ChatService, ChatSettings};
use chatgate_core::llm::box_provider::BoxLlmProvider;
use chatgate_infra::config::{
    SECRET_KEY_ENV, SecretSource, apply_provider_env, load_gateway_config, resolve_api_key,
    resolve_data_dir, resolve_signing_secret,
};
use chatgate_infra::crypto::password::Argon2PasswordHasher;
use chatgate_infra::crypto::token::JwtTokenCodec;
use chatgate_infra::llm::create_provider;
use chatgate_infra::llm::unavailable::UnavailableProvider;
use chatgate_infra::sqlite::history::SqliteHistoryRepository;
use chatgate_infra::sqlite::pool::{DatabasePool, default_database_url};
use chatgate_infra::sqlite::user::SqliteUserRepository;
use chatgate_types::config::GatewayConfig;

/// Demo account ensured at startup when `seed_test_user` is enabled.
pub const TEST_USERNAME: &str = "testAI";
pub const TEST_PASSWORD: &str = "testAI00!";

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthenticator =
    Authenticator<SqliteUserRepository, Argon2PasswordHasher, JwtTokenCodec>;

pub type ConcreteSessionGuard = SessionGuard<JwtTokenCodec>;

pub type ConcreteUserService = UserService<SqliteUserRepository, Argon2PasswordHasher>;

pub type ConcreteChatService = ChatService<SqliteHistoryRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<ConcreteAuthenticator>,
    pub guard: Arc<ConcreteSessionGuard>,
    pub user_service: Arc<ConcreteUserService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub provider: Arc<BoxLlmProvider>,
    pub config: Arc<GatewayConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init(database_url: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let mut config = load_gateway_config(&data_dir).await;
        config.provider = apply_provider_env(&config.provider, |key| std::env::var(key).ok());

        let db_url = database_url.unwrap_or_else(default_database_url);
        let db_pool = DatabasePool::new(&db_url).await?;

        let (secret, source) = resolve_signing_secret(std::env::var(SECRET_KEY_ENV).ok());
        if source == SecretSource::Generated {
            warn!(
                "{SECRET_KEY_ENV} is not set; using a random signing secret, \
                 issued tokens will not survive a restart"
            );
        }

        let provider = match create_provider(&config.provider, resolve_api_key(&config.provider)) {
            Ok(provider) => provider,
            Err(e) => {
                warn!(error = %e, "completion provider unavailable, chat calls will fail");
                BoxLlmProvider::new(UnavailableProvider::new(e.to_string()))
            }
        };

        let state = Self::from_parts(config, db_pool, provider, &secret, data_dir);

        if state.config.seed_test_user {
            let created = state
                .user_service
                .ensure_user(TEST_USERNAME, TEST_PASSWORD)
                .await?;
            if created {
                info!(username = TEST_USERNAME, "seeded test user");
            }
        }

        Ok(state)
    }

    /// Wire services over an already-open pool and provider.
    pub fn from_parts(
        config: GatewayConfig,
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
        secret: &SecretString,
        data_dir: PathBuf,
    ) -> Self {
        let users = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let hasher = Arc::new(Argon2PasswordHasher::new());
        let codec = Arc::new(JwtTokenCodec::new(secret));
        let provider = Arc::new(provider);

        let settings = ChatSettings {
            default_system_prompt: default_system_prompt(&config.response_language),
            default_max_tokens: config.default_max_tokens,
            default_temperature: config.default_temperature,
            history_limit: config.history_limit,
        };

        let authenticator = Authenticator::new(
            Arc::clone(&users),
            Arc::clone(&hasher),
            Arc::clone(&codec),
            Duration::minutes(config.session_ttl_minutes),
        );
        let chat_service = ChatService::new(
            Arc::clone(&provider),
            Arc::new(SqliteHistoryRepository::new(db_pool.clone())),
            settings,
        );

        Self {
            authenticator: Arc::new(authenticator),
            guard: Arc::new(SessionGuard::new(codec)),
            user_service: Arc::new(UserService::new(users, hasher)),
            chat_service: Arc::new(chat_service),
            provider,
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
