//! Append-only JSONL transcript logging.
//!
//! One `{log_dir}/{session_id}.jsonl` file per session, one JSON record per
//! line per message. Append-only, no rotation. Logging is strictly
//! best-effort: any I/O failure is logged through `tracing` and swallowed —
//! a full disk must never abort a conversation turn.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rivet_core::message::{Message, Role, SessionId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One line of the JSONL transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Present only on assistant records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Appends messages to the session's transcript file.
pub struct TranscriptLogger {
    path: PathBuf,
    session_id: SessionId,
}

impl TranscriptLogger {
    pub fn new(log_dir: &Path, session_id: SessionId) -> Self {
        Self {
            path: log_dir.join(format!("{session_id}.jsonl")),
            session_id,
        }
    }

    /// The file this logger appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one message as a JSONL record. Failures are warned and
    /// swallowed.
    pub fn log(&self, message: &Message) {
        let record = TranscriptRecord {
            timestamp: message.timestamp,
            session_id: self.session_id.to_string(),
            role: message.role,
            content: message.content.clone(),
            model: message.model.clone(),
        };

        if let Err(e) = self.append(&record) {
            warn!(path = %self.path.display(), error = %e, "Failed to write transcript record");
        }
    }

    fn append(&self, record: &TranscriptRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}
