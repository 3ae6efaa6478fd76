//! Session identifiers.
//!
//! Ids name files on disk, so only a conservative character set is accepted.

use synapse_domain::error::{Error, Result};
use synapse_domain::trace::TraceEvent;

pub const MAX_SESSION_ID_LEN: usize = 128;

/// Mint a fresh session id (v4 UUID).
pub fn new_session_id() -> String {
    let id = uuid::Uuid::new_v4().to_string();
    TraceEvent::SessionStarted {
        session_id: id.clone(),
    }
    .emit();
    id
}

/// Accepts 1..=128 characters of `[A-Za-z0-9_.-]` not starting with `.`.
pub fn validate_session_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::Validation("sessionId must not be empty".into()));
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(Error::Validation(format!(
            "sessionId must be at most {MAX_SESSION_ID_LEN} characters"
        )));
    }
    if id.starts_with('.') {
        return Err(Error::Validation("sessionId must not start with '.'".into()));
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
    {
        return Err(Error::Validation(
            "sessionId may only contain letters, digits, '_', '-' and '.'".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        validate_session_id(&a).unwrap();
    }

    #[test]
    fn accepts_reasonable_ids() {
        for id in ["abc", "langchain-test-session", "user_42.v2", "A"] {
            validate_session_id(id).unwrap();
        }
        validate_session_id(&"x".repeat(MAX_SESSION_ID_LEN)).unwrap();
    }

    #[test]
    fn rejects_path_like_ids() {
        for id in ["", "..", ".hidden", "../etc/passwd", "a/b", "a\\b", "sp ace", "ünï"] {
            let err = validate_session_id(id).unwrap_err();
            assert!(err.is_validation(), "{id:?}");
        }
        assert!(validate_session_id(&"x".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }
}
