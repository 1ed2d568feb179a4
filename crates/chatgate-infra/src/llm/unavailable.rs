//! Stand-in provider used when no completion backend could be configured.
//!
//! Every call fails with [`LlmError::NotConfigured`], so login, history and
//! the provisioning commands keep working without an API key.

use chatgate_core::llm::provider::{LlmEventStream, LlmProvider};
use chatgate_types::llm::{CompletionRequest, CompletionResponse, LlmError};

pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LlmProvider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }

    fn stream(&self, _request: CompletionRequest) -> LlmEventStream {
        let err = LlmError::NotConfigured(self.reason.clone());
        Box::pin(futures_util::stream::once(async move { Err(err) }))
    }
}
