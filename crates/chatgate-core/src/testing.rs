//! In-memory fakes for unit tests: stores, hasher, token codec, provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures_util::stream;

use chatgate_types::chat::{ChatExchange, NewChatExchange};
use chatgate_types::error::{PasswordError, RepositoryError, TokenError};
use chatgate_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent, Usage};
use chatgate_types::session::TokenClaims;
use chatgate_types::user::{Credential, UserProfile};

use crate::auth::password::CredentialHasher;
use crate::auth::token::TokenCodec;
use crate::llm::provider::{LlmEventStream, LlmProvider};
use crate::repository::history::HistoryRepository;
use crate::repository::user::UserRepository;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<Credential>>,
}

impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, RepositoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|c| c.username == username).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Credential, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|c| c.username == username) {
            return Err(RepositoryError::Conflict(format!("username '{username}' exists")));
        }
        let credential = Credential {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(credential.clone());
        Ok(credential)
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().map(Credential::profile).collect())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryHistoryRepository {
    exchanges: Mutex<Vec<ChatExchange>>,
    fail_appends: AtomicBool,
}

impl MemoryHistoryRepository {
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

impl HistoryRepository for MemoryHistoryRepository {
    async fn append(&self, exchange: &NewChatExchange) -> Result<ChatExchange, RepositoryError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let mut exchanges = self.exchanges.lock().unwrap();
        let saved = ChatExchange {
            id: exchanges.len() as i64 + 1,
            username: exchange.username.clone(),
            user_message: exchange.user_message.clone(),
            assistant_message: exchange.assistant_message.clone(),
            created_at: exchange.created_at,
        };
        exchanges.push(saved.clone());
        Ok(saved)
    }

    async fn list_by_user(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<ChatExchange>, RepositoryError> {
        let mut owned: Vec<ChatExchange> = self
            .exchanges
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect();
        owned.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        owned.truncate(limit as usize);
        Ok(owned)
    }

    async fn delete_all_by_user(&self, username: &str) -> Result<u64, RepositoryError> {
        let mut exchanges = self.exchanges.lock().unwrap();
        let before = exchanges.len();
        exchanges.retain(|e| e.username != username);
        Ok((before - exchanges.len()) as u64)
    }
}

/// Reversible "hash" with a recognizable prefix.
pub struct FakeHasher;

impl CredentialHasher for FakeHasher {
    async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        Ok(format!("fake${}", password.chars().rev().collect::<String>()))
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, PasswordError> {
        let Some(stored) = password_hash.strip_prefix("fake$") else {
            return Err(PasswordError::InvalidHash(password_hash.to_string()));
        };
        Ok(stored == password.chars().rev().collect::<String>())
    }
}

/// `subject|iat|exp|sig` tokens keyed by a secret.
pub struct FakeTokenCodec {
    secret: String,
}

impl FakeTokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    fn sign(&self, payload: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.secret.hash(&mut hasher);
        payload.hash(&mut hasher);
        hasher.finish()
    }
}

impl TokenCodec for FakeTokenCodec {
    fn encode(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let payload = format!("{subject}|{}|{}", issued_at.timestamp(), expires_at.timestamp());
        Ok(format!("{payload}|{}", self.sign(&payload)))
    }

    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let malformed = || TokenError::Malformed(token.to_string());
        let (payload, sig) = token.rsplit_once('|').ok_or_else(malformed)?;
        if sig.parse::<u64>().ok() != Some(self.sign(payload)) {
            return Err(malformed());
        }
        let mut parts = payload.split('|');
        let subject = parts.next().ok_or_else(malformed)?;
        let iat: i64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let exp: i64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let issued_at = DateTime::from_timestamp(iat, 0).ok_or_else(malformed)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or_else(malformed)?;
        if expires_at <= now {
            return Err(TokenError::Expired);
        }
        Ok(TokenClaims {
            subject: subject.to_string(),
            issued_at,
            expires_at,
        })
    }
}

/// What a [`ScriptedProvider`] does when called.
#[derive(Clone)]
pub enum Script {
    Reply(String),
    Fail(String),
    Fragments(Vec<String>),
    FragmentsThenFail(Vec<String>, String),
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Self::Reply(text.to_string())
    }

    pub fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }

    pub fn fragments(parts: &[&str]) -> Self {
        Self::Fragments(parts.iter().map(|p| p.to_string()).collect())
    }

    pub fn fragments_then_fail(parts: &[&str], message: &str) -> Self {
        Self::FragmentsThenFail(parts.iter().map(|p| p.to_string()).collect(), message.to_string())
    }
}

/// Provider stub that replays a [`Script`] and counts calls.
#[derive(Clone)]
pub struct ScriptedProvider {
    script: Script,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, request: &CompletionRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.record(request);
        let content = match &self.script {
            Script::Reply(text) => text.clone(),
            Script::Fragments(parts) => parts.concat(),
            Script::Fail(message) | Script::FragmentsThenFail(_, message) => {
                return Err(LlmError::Provider {
                    message: message.clone(),
                });
            }
        };
        Ok(CompletionResponse {
            content,
            model: "scripted-model".to_string(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }

    fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        self.record(&request);
        let deltas = |parts: &[String]| -> Vec<Result<StreamEvent, LlmError>> {
            parts
                .iter()
                .map(|p| Ok(StreamEvent::TextDelta { text: p.clone() }))
                .collect()
        };
        let mut events = vec![Ok(StreamEvent::Connected)];
        match &self.script {
            Script::Reply(text) => {
                events.push(Ok(StreamEvent::TextDelta { text: text.clone() }));
                events.push(Ok(StreamEvent::Done));
            }
            Script::Fragments(parts) => {
                events.extend(deltas(parts));
                events.push(Ok(StreamEvent::Usage(Usage::default())));
                events.push(Ok(StreamEvent::Done));
            }
            Script::Fail(message) => events.push(Err(LlmError::Provider {
                message: message.clone(),
            })),
            Script::FragmentsThenFail(parts, message) => {
                events.extend(deltas(parts));
                events.push(Err(LlmError::Stream(message.clone())));
            }
        }
        Box::pin(stream::iter(events))
    }
}
