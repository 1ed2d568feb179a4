//! System prompt resolution and completion request assembly.

use chatgate_types::chat::{ChatMessage, ChatRequest};
use chatgate_types::llm::{CompletionRequest, Message};

/// The default system prompt, parameterized by the response language.
pub fn default_system_prompt(language: &str) -> String {
    format!(
        "You are a kind and knowledgeable AI assistant.\n\
         Provide accurate and useful answers to the user's questions.\n\
         Respond in {language}."
    )
}

/// Decide which system prompt, if any, to inject ahead of the conversation.
///
/// An explicit non-blank `system_prompt` wins. Otherwise a conversation that
/// already carries a system-role message is left alone. Otherwise the
/// default prompt applies.
pub fn resolve_system_prompt(request: &ChatRequest, default_prompt: &str) -> Option<String> {
    match request.system_prompt.as_deref() {
        Some(explicit) if !explicit.trim().is_empty() => Some(explicit.to_string()),
        _ if request.has_system_message() => None,
        _ => Some(default_prompt.to_string()),
    }
}

/// Convert caller-supplied chat messages into provider messages, in order.
pub fn to_provider_messages(messages: &[ChatMessage]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| Message {
            role: m.role,
            content: m.content.clone(),
        })
        .collect()
}

/// Assemble the provider request for a chat call.
pub fn build_completion_request(
    request: &ChatRequest,
    default_prompt: &str,
    default_max_tokens: u32,
    default_temperature: f64,
    stream: bool,
) -> CompletionRequest {
    CompletionRequest {
        model: String::new(),
        messages: to_provider_messages(&request.messages),
        system: resolve_system_prompt(request, default_prompt),
        max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
        temperature: Some(request.temperature.unwrap_or(default_temperature)),
        stream,
    }
}
