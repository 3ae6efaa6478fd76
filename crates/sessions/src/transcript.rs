//! Append-only JSONL history files.
//!
//! Each session gets a `<sessionId>.jsonl` file under the history directory.
//! Every turn is one JSON line. A batch is serialized up front and written
//! with a single `write_all` on an append-mode handle.
//!
//! The file is the only copy: every load reads it whole, so a load always
//! sees every append that completed before it started. Blocking I/O runs on
//! `spawn_blocking`.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use synapse_domain::error::{Error, Result};
use synapse_domain::trace::TraceEvent;

use crate::history::{ConversationTurn, HistoryStore};
use crate::session_id::validate_session_id;

pub struct FileHistoryStore {
    base_dir: PathBuf,
}

impl FileHistoryStore {
    /// Open (and create if needed) the history directory.
    pub fn open(base_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_dir)?;
        tracing::debug!(dir = %base_dir.display(), "history directory ready");
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf> {
        validate_session_id(session_id)?;
        Ok(self.base_dir.join(format!("{session_id}.jsonl")))
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        let path = self.path_for(session_id)?;
        let sid = session_id.to_owned();
        tokio::task::spawn_blocking(move || read_jsonl_file(&path, &sid))
            .await
            .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))?
    }

    async fn append(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }

        let path = self.path_for(session_id)?;
        let buf = serialize_turns(turns)?;

        tokio::task::spawn_blocking(move || {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            file.write_all(buf.as_bytes())?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))??;

        TraceEvent::TranscriptAppend {
            session_id: session_id.to_owned(),
            lines: turns.len(),
        }
        .emit();

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

fn serialize_turns(turns: &[ConversationTurn]) -> Result<String> {
    let mut buf = String::new();
    for turn in turns {
        buf.push_str(&serde_json::to_string(turn)?);
        buf.push('\n');
    }
    Ok(buf)
}

fn read_jsonl_file(path: &Path, session_id: &str) -> Result<Vec<ConversationTurn>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut turns = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ConversationTurn>(line) {
            Ok(turn) => turns.push(turn),
            Err(e) => {
                tracing::warn!(
                    session_id = session_id,
                    error = %e,
                    "skipping malformed history line"
                );
            }
        }
    }
    Ok(turns)
}
