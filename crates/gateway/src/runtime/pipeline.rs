use serde::{Deserialize, Serialize};
use tracing::Instrument;

use synapse_domain::error::{Error, Result};
use synapse_domain::message::Message;
use synapse_providers::{ChatModel, ChatRequest};
use synapse_sessions::{validate_session_id, ConversationTurn, HistoryStore};

/// Instruction placed ahead of every conversation.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer all questions to the best of your ability.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / result shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Body of `POST /invoke`. Both fields are optional on the wire so that
/// their absence is reported as a validation error, not a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

impl InvocationRequest {
    pub fn new(input: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            session_id: Some(session_id.into()),
        }
    }

    /// Split into `(input, session_id)`, rejecting empty or malformed values.
    fn into_parts(self) -> Result<(String, String)> {
        match (self.input, self.session_id) {
            (Some(input), Some(session_id)) if !input.is_empty() && !session_id.is_empty() => {
                validate_session_id(&session_id)?;
                Ok((input, session_id))
            }
            _ => Err(Error::Validation(
                "Both Input and sessionId are required.".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    pub response: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one invocation: validate, load history, call the model once, then
/// append the human and assistant turns.
///
/// Nothing is appended unless the model call succeeded. There are no
/// retries; every failure is returned to the caller as-is.
pub async fn invoke(
    model: &dyn ChatModel,
    history: &dyn HistoryStore,
    request: InvocationRequest,
) -> Result<InvocationResult> {
    let (input, session_id) = request.into_parts()?;

    let span = tracing::info_span!(
        "invoke",
        session_id = %session_id,
        provider = %model.provider_id(),
        model = %model.model(),
    );

    async move {
        let past = history.load(&session_id).await?;
        tracing::debug!(history_turns = past.len(), "loaded session history");

        let mut messages = Vec::with_capacity(past.len() + 2);
        messages.push(Message::system(SYSTEM_PROMPT));
        messages.extend(past.iter().map(ConversationTurn::to_message));
        messages.push(Message::user(input.as_str()));

        let reply = model.chat(&ChatRequest::new(messages)).await?;

        history
            .append(
                &session_id,
                &[
                    ConversationTurn::human(input),
                    ConversationTurn::assistant(reply.content.as_str()),
                ],
            )
            .await?;

        Ok(InvocationResult {
            response: reply.content,
        })
    }
    .instrument(span)
    .await
}
