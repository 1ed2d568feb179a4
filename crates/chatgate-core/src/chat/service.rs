//! Chat orchestrator: provider calls in buffered and streaming mode, plus
//! per-user history.
//!
//! A chat call records exactly one exchange, and only once the provider has
//! produced the whole answer. History write failures never fail the call;
//! they are logged and swallowed.

use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use chatgate_types::chat::{
    AssistantReply, ChatCallState, ChatExchange, ChatRequest, ChatStreamEvent, NewChatExchange,
    DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use chatgate_types::error::ChatError;
use chatgate_types::llm::StreamEvent;
use chatgate_types::session::Identity;

use super::prompt::{build_completion_request, default_system_prompt};
use super::stream::{CallTracker, ChatStream};
use crate::llm::box_provider::BoxLlmProvider;
use crate::repository::history::HistoryRepository;

/// Deployment-level chat defaults.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Injected when the caller supplies neither a system prompt nor a
    /// system-role message.
    pub default_system_prompt: String,
    pub default_max_tokens: u32,
    pub default_temperature: f64,
    pub history_limit: u32,
}

impl ChatSettings {
    /// Defaults with the system prompt asking for answers in `language`.
    pub fn for_language(language: &str) -> Self {
        Self {
            default_system_prompt: default_system_prompt(language),
            ..Self::default()
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_system_prompt: default_system_prompt("Japanese"),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Orchestrates chat calls for authenticated callers.
///
/// Generic over the history store so tests can swap in an in-memory one;
/// the provider is injected already boxed.
pub struct ChatService<H: HistoryRepository> {
    provider: Arc<BoxLlmProvider>,
    history: Arc<H>,
    settings: ChatSettings,
}

impl<H: HistoryRepository + 'static> ChatService<H> {
    pub fn new(provider: Arc<BoxLlmProvider>, history: Arc<H>, settings: ChatSettings) -> Self {
        Self {
            provider,
            history,
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Buffered mode: one provider call, full answer, then one history record.
    pub async fn complete(
        &self,
        identity: &Identity,
        request: ChatRequest,
    ) -> Result<AssistantReply, ChatError> {
        let completion = build_completion_request(
            &request,
            &self.settings.default_system_prompt,
            self.settings.default_max_tokens,
            self.settings.default_temperature,
            false,
        );

        debug!(
            username = %identity,
            messages = completion.messages.len(),
            max_tokens = completion.max_tokens,
            "dispatching chat completion"
        );

        let response = self.provider.complete(&completion).await.map_err(|e| {
            warn!(username = %identity, provider = self.provider.name(), error = %e, "chat completion failed");
            ChatError::Provider(e.to_string())
        })?;

        let exchange = NewChatExchange {
            username: identity.username().to_string(),
            user_message: request.last_user_message().to_string(),
            assistant_message: response.content.clone(),
            created_at: Utc::now(),
        };
        record_exchange(self.history.as_ref(), exchange).await;

        info!(
            username = %identity,
            model = %response.model,
            total_tokens = response.usage.map(|u| u.total_tokens),
            "chat completion finished"
        );

        Ok(AssistantReply {
            message: response.content,
            usage: response.usage,
            timestamp: Utc::now(),
        })
    }

    /// Streaming mode: fragments as the provider emits them, then `Done`.
    ///
    /// The exchange is recorded only after the provider finished the answer.
    /// A provider failure yields one `Err` and records nothing. Dropping the
    /// returned stream before `Done` abandons the call and records nothing.
    pub fn complete_stream(&self, identity: &Identity, request: ChatRequest) -> ChatStream {
        let completion = build_completion_request(
            &request,
            &self.settings.default_system_prompt,
            self.settings.default_max_tokens,
            self.settings.default_temperature,
            true,
        );
        let username = identity.username().to_string();
        let user_message = request.last_user_message().to_string();
        let provider = Arc::clone(&self.provider);
        let history = Arc::clone(&self.history);
        let (mut call, state) = CallTracker::new(&username);

        let inner = async_stream::try_stream! {
            call.advance(ChatCallState::Dispatched);
            debug!(username = %username, provider = provider.name(), "dispatching chat stream");

            let mut upstream = provider.stream(completion);
            let mut full_text = String::new();
            let mut fragments: usize = 0;

            while let Some(event) = upstream.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        call.advance(ChatCallState::Streaming);
                        fragments += 1;
                        full_text.push_str(&text);
                        yield ChatStreamEvent::Fragment(text);
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(StreamEvent::Connected | StreamEvent::Usage(_)) => {}
                    Err(e) => {
                        warn!(
                            username = %username,
                            fragments,
                            error = %e,
                            "chat stream failed"
                        );
                        call.advance(ChatCallState::Failed);
                        Err(ChatError::Provider(e.to_string()))?;
                    }
                }
            }

            // An empty answer still passes through Streaming on its way out.
            if call.state() == ChatCallState::Dispatched {
                call.advance(ChatCallState::Streaming);
            }
            call.advance(ChatCallState::Completed);

            info!(username = %username, fragments, chars = full_text.len(), "chat stream finished");

            // Spawned before `Done` goes out so a consumer that stops reading
            // right after `Done` still gets the exchange recorded.
            let exchange = NewChatExchange {
                username: username.clone(),
                user_message,
                assistant_message: full_text,
                created_at: Utc::now(),
            };
            let persist = tokio::spawn(async move {
                record_exchange(history.as_ref(), exchange).await;
            });

            yield ChatStreamEvent::Done;

            if let Err(e) = persist.await {
                warn!(username = %username, error = %e, "history persistence task failed");
            }
        };

        ChatStream::new(Box::pin(inner), state)
    }

    /// The caller's exchanges, most recent first, up to `limit` (or the
    /// configured default).
    pub async fn get_history(
        &self,
        identity: &Identity,
        limit: Option<u32>,
    ) -> Result<Vec<ChatExchange>, ChatError> {
        let limit = limit.unwrap_or(self.settings.history_limit);
        self.history
            .list_by_user(identity.username(), limit)
            .await
            .map_err(|e| {
                warn!(username = %identity, error = %e, "failed to read chat history");
                ChatError::History(e.to_string())
            })
    }

    /// Delete every exchange the caller owns. Returns how many were removed;
    /// clearing an empty history succeeds with zero.
    pub async fn clear_history(&self, identity: &Identity) -> Result<u64, ChatError> {
        let removed = self
            .history
            .delete_all_by_user(identity.username())
            .await
            .map_err(|e| {
                warn!(username = %identity, error = %e, "failed to clear chat history");
                ChatError::History(e.to_string())
            })?;
        info!(username = %identity, removed, "chat history cleared");
        Ok(removed)
    }
}

/// Append one exchange; failures are logged and swallowed.
async fn record_exchange<H: HistoryRepository>(history: &H, exchange: NewChatExchange) {
    match history.append(&exchange).await {
        Ok(saved) => debug!(username = %saved.username, id = saved.id, "chat exchange recorded"),
        Err(e) => warn!(
            username = %exchange.username,
            error = %e,
            "failed to record chat exchange, reply delivered anyway"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;

    use chatgate_types::chat::ChatMessage;
    use chatgate_types::llm::MessageRole;

    use super::*;
    use crate::testing::{MemoryHistoryRepository, Script, ScriptedProvider};

    fn service_with(
        script: Script,
    ) -> (
        ChatService<MemoryHistoryRepository>,
        Arc<MemoryHistoryRepository>,
        ScriptedProvider,
    ) {
        let provider = ScriptedProvider::new(script);
        let history = Arc::new(MemoryHistoryRepository::default());
        let service = ChatService::new(
            Arc::new(BoxLlmProvider::new(provider.clone())),
            Arc::clone(&history),
            ChatSettings::for_language("Japanese"),
        );
        (service, history, provider)
    }

    fn alice() -> Identity {
        Identity::new("alice")
    }

    #[tokio::test]
    async fn test_complete_records_one_exchange() {
        let (service, history, provider) = service_with(Script::reply("hi"));
        let request = ChatRequest::new(vec![ChatMessage::user("hello")]);

        let reply = service.complete(&alice(), request).await.unwrap();
        assert_eq!(reply.message, "hi");
        assert_eq!(provider.calls(), 1);

        let saved = history.list_by_user("alice", 50).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].user_message, "hello");
        assert_eq!(saved[0].assistant_message, "hi");
    }

    #[tokio::test]
    async fn test_complete_sends_default_system_prompt_and_defaults() {
        let (service, _, provider) = service_with(Script::reply("ok"));
        service
            .complete(&alice(), ChatRequest::new(vec![ChatMessage::user("hello")]))
            .await
            .unwrap();

        let sent = provider.last_request().unwrap();
        assert!(sent.system.unwrap().ends_with("Respond in Japanese."));
        assert_eq!(sent.max_tokens, 1000);
        assert_eq!(sent.temperature, Some(0.7));
        assert!(!sent.stream);
    }

    #[tokio::test]
    async fn test_complete_records_last_user_message() {
        let (service, history, _) = service_with(Script::reply("reply"));
        let request = ChatRequest::new(vec![
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
        ]);
        service.complete(&alice(), request).await.unwrap();
        let saved = history.list_by_user("alice", 50).await.unwrap();
        assert_eq!(saved[0].user_message, "c");
    }

    #[tokio::test]
    async fn test_complete_without_user_message_records_empty_user_text() {
        let (service, history, _) = service_with(Script::reply("hello there"));
        let request = ChatRequest::new(vec![ChatMessage::new(MessageRole::System, "be nice")]);
        service.complete(&alice(), request).await.unwrap();
        let saved = history.list_by_user("alice", 50).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].user_message, "");
        assert_eq!(saved[0].assistant_message, "hello there");
    }

    #[tokio::test]
    async fn test_complete_provider_failure_records_nothing() {
        let (service, history, _) = service_with(Script::fail("upstream down"));
        let err = service
            .complete(&alice(), ChatRequest::new(vec![ChatMessage::user("hello")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Provider(msg) if msg.contains("upstream down")));
        assert!(history.list_by_user("alice", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_succeeds_when_history_write_fails() {
        let (service, history, _) = service_with(Script::reply("hi"));
        history.fail_appends(true);
        let reply = service
            .complete(&alice(), ChatRequest::new(vec![ChatMessage::user("hello")]))
            .await
            .unwrap();
        assert_eq!(reply.message, "hi");
        history.fail_appends(false);
        assert!(history.list_by_user("alice", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_yields_fragments_then_done_and_records_once() {
        let (service, history, _) = service_with(Script::fragments(&["Hel", "lo", "!"]));
        let stream = service.complete_stream(
            &alice(),
            ChatRequest::new(vec![ChatMessage::user("hello")]),
        );
        let state = stream.state_handle();
        let items: Vec<_> = stream.collect().await;

        let events: Vec<ChatStreamEvent> = items.into_iter().map(|i| i.unwrap()).collect();
        assert_eq!(
            events,
            vec![
                ChatStreamEvent::Fragment("Hel".into()),
                ChatStreamEvent::Fragment("lo".into()),
                ChatStreamEvent::Fragment("!".into()),
                ChatStreamEvent::Done,
            ]
        );
        assert_eq!(state.get(), ChatCallState::Completed);

        let saved = history.list_by_user("alice", 50).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].assistant_message, "Hello!");
        assert_eq!(saved[0].user_message, "hello");
    }

    #[tokio::test]
    async fn test_stream_failure_after_fragments_records_nothing() {
        let (service, history, _) =
            service_with(Script::fragments_then_fail(&["par", "tial"], "connection reset"));
        let stream = service.complete_stream(
            &alice(),
            ChatRequest::new(vec![ChatMessage::user("hello")]),
        );
        let state = stream.state_handle();
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], Ok(ChatStreamEvent::Fragment(f)) if f == "par"));
        assert!(matches!(&items[1], Ok(ChatStreamEvent::Fragment(f)) if f == "tial"));
        assert!(matches!(&items[2], Err(ChatError::Provider(_))));
        assert_eq!(state.get(), ChatCallState::Failed);
        assert!(history.list_by_user("alice", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_failure_before_first_fragment() {
        let (service, history, _) = service_with(Script::fail("bad key"));
        let mut stream = service.complete_stream(
            &alice(),
            ChatRequest::new(vec![ChatMessage::user("hello")]),
        );
        assert!(matches!(stream.next().await, Some(Err(ChatError::Provider(_)))));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.state(), ChatCallState::Failed);
        assert!(history.list_by_user("alice", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_stream_records_nothing() {
        let (service, history, _) = service_with(Script::fragments(&["one", "two", "three"]));
        let mut stream = service.complete_stream(
            &alice(),
            ChatRequest::new(vec![ChatMessage::user("hello")]),
        );
        let state = stream.state_handle();
        assert!(matches!(stream.next().await, Some(Ok(ChatStreamEvent::Fragment(_)))));
        drop(stream);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(state.get(), ChatCallState::Failed);
        assert!(history.list_by_user("alice", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_dropped_right_after_done_still_records() {
        let (service, history, _) = service_with(Script::fragments(&["only"]));
        let mut stream = service.complete_stream(
            &alice(),
            ChatRequest::new(vec![ChatMessage::user("hello")]),
        );
        assert!(matches!(stream.next().await, Some(Ok(ChatStreamEvent::Fragment(_)))));
        assert!(matches!(stream.next().await, Some(Ok(ChatStreamEvent::Done))));
        drop(stream);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(history.list_by_user("alice", 50).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_stream_completes_with_empty_answer() {
        let (service, history, _) = service_with(Script::fragments(&[]));
        let stream = service.complete_stream(
            &alice(),
            ChatRequest::new(vec![ChatMessage::user("hello")]),
        );
        let state = stream.state_handle();
        let items: Vec<_> = stream.collect().await;
        assert!(matches!(items.as_slice(), [Ok(ChatStreamEvent::Done)]));
        assert_eq!(state.get(), ChatCallState::Completed);
        let saved = history.list_by_user("alice", 50).await.unwrap();
        assert_eq!(saved[0].assistant_message, "");
    }

    #[tokio::test]
    async fn test_history_is_scoped_per_user_and_newest_first() {
        let (service, _, _) = service_with(Script::reply("r"));
        let bob = Identity::new("bob");
        for text in ["first", "second"] {
            service
                .complete(&alice(), ChatRequest::new(vec![ChatMessage::user(text)]))
                .await
                .unwrap();
        }
        service
            .complete(&bob, ChatRequest::new(vec![ChatMessage::user("bob's")]))
            .await
            .unwrap();

        let alice_history = service.get_history(&alice(), None).await.unwrap();
        assert_eq!(alice_history.len(), 2);
        assert_eq!(alice_history[0].user_message, "second");
        assert_eq!(alice_history[1].user_message, "first");
        assert!(alice_history.iter().all(|e| e.username == "alice"));

        let limited = service.get_history(&alice(), Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_history_is_idempotent_and_scoped() {
        let (service, _, _) = service_with(Script::reply("r"));
        let bob = Identity::new("bob");
        service
            .complete(&alice(), ChatRequest::new(vec![ChatMessage::user("x")]))
            .await
            .unwrap();
        service
            .complete(&bob, ChatRequest::new(vec![ChatMessage::user("y")]))
            .await
            .unwrap();

        assert_eq!(service.clear_history(&alice()).await.unwrap(), 1);
        assert_eq!(service.clear_history(&alice()).await.unwrap(), 0);
        assert!(service.get_history(&alice(), None).await.unwrap().is_empty());
        assert_eq!(service.get_history(&bob, None).await.unwrap().len(), 1);
    }
}
