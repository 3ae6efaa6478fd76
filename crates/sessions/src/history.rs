use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synapse_domain::error::Result;
use synapse_domain::message::Message;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Human,
    Assistant,
}

/// One persisted exchange half. Stored as a single JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn human(content: impl Into<String>) -> Self {
        Self::now(TurnRole::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(TurnRole::Assistant, content)
    }

    fn now(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            role,
            content: content.into(),
        }
    }

    /// The provider-agnostic message this turn replays as.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::Human => Message::user(self.content.as_str()),
            TurnRole::Assistant => Message::assistant(self.content.as_str()),
        }
    }
}

/// Durable, append-only storage of turns keyed by session id.
///
/// Implementations must be safe for concurrent use with distinct ids. Two
/// concurrent appends for the same id may interleave at batch granularity;
/// no stronger ordering is provided.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All turns for `session_id` in append order. Empty for unseen ids.
    async fn load(&self, session_id: &str) -> Result<Vec<ConversationTurn>>;

    /// Append `turns` as one batch. A no-op for an empty slice.
    async fn append(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<()>;

    /// Short label for logs and `/status`.
    fn backend(&self) -> &'static str;
}
