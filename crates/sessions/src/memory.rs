use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use synapse_domain::error::Result;
use synapse_domain::trace::TraceEvent;

use crate::history::{ConversationTurn, HistoryStore};

/// Process-local history. Lost on restart.
#[derive(Default)]
pub struct MemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<ConversationTurn>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with at least one turn.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }
        self.sessions
            .write()
            .entry(session_id.to_owned())
            .or_default()
            .extend(turns.iter().cloned());

        TraceEvent::TranscriptAppend {
            session_id: session_id.to_owned(),
            lines: turns.len(),
        }
        .emit();
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
