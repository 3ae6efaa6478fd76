//! Per-session conversation history for Synapse.
//!
//! A session is identified by an opaque, filesystem-safe `sessionId`. Its
//! history is an ordered, append-only list of human/assistant turns, created
//! lazily on first append and never deleted.

pub mod history;
pub mod memory;
pub mod session_id;
pub mod transcript;

pub use history::{ConversationTurn, HistoryStore, TurnRole};
pub use memory::MemoryHistoryStore;
pub use session_id::{new_session_id, validate_session_id};
pub use transcript::FileHistoryStore;
