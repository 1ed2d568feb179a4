//! Streaming chat call: the consumer-facing stream and its state tracker.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use futures_util::Stream;
use tracing::{debug, info, warn};

use chatgate_types::chat::{ChatCallState, ChatStreamEvent};
use chatgate_types::error::ChatError;

type InnerStream = Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, ChatError>> + Send + 'static>>;

/// Shared, observable lifecycle state of one streaming call.
#[derive(Debug, Clone)]
pub struct CallStateHandle(Arc<Mutex<ChatCallState>>);

impl CallStateHandle {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(ChatCallState::Pending)))
    }

    fn lock(&self) -> MutexGuard<'_, ChatCallState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> ChatCallState {
        *self.lock()
    }
}

/// Drives a [`CallStateHandle`] through legal transitions.
///
/// Lives inside the generator that produces the stream, so dropping the
/// stream drops the tracker. A tracker dropped in a non-terminal state
/// means the consumer went away mid-call: the call is marked `Failed`.
pub(crate) struct CallTracker {
    state: CallStateHandle,
    username: String,
}

impl CallTracker {
    pub(crate) fn new(username: &str) -> (Self, CallStateHandle) {
        let state = CallStateHandle::new();
        let tracker = Self {
            state: state.clone(),
            username: username.to_string(),
        };
        (tracker, state)
    }

    pub(crate) fn state(&self) -> ChatCallState {
        self.state.get()
    }

    pub(crate) fn advance(&mut self, next: ChatCallState) {
        let mut current = self.state.lock();
        let from = *current;
        if !from.can_transition_to(next) {
            warn!(
                username = %self.username,
                %from,
                to = %next,
                "ignoring illegal chat call transition"
            );
            return;
        }
        if from != next {
            debug!(username = %self.username, %from, to = %next, "chat call transition");
        }
        *current = next;
    }
}

impl Drop for CallTracker {
    fn drop(&mut self) {
        let mut current = self.state.lock();
        let state = *current;
        if !state.is_terminal() {
            info!(
                username = %self.username,
                %state,
                "chat stream dropped before completion, nothing recorded"
            );
            *current = ChatCallState::Failed;
        }
    }
}

/// Consumer-facing stream of a streaming chat call.
///
/// Yields `Fragment`s in provider order, then exactly one `Done`, or a single
/// `Err` if the provider fails. Nothing is yielded after `Done` or an error.
pub struct ChatStream {
    inner: InnerStream,
    state: CallStateHandle,
}

impl ChatStream {
    pub(crate) fn new(inner: InnerStream, state: CallStateHandle) -> Self {
        Self { inner, state }
    }

    /// Current lifecycle state of the call.
    pub fn state(&self) -> ChatCallState {
        self.state.get()
    }

    /// A handle that keeps observing the state after the stream is consumed.
    pub fn state_handle(&self) -> CallStateHandle {
        self.state.clone()
    }
}

impl Stream for ChatStream {
    type Item = Result<ChatStreamEvent, ChatError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
