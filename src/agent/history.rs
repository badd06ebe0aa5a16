use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::errors::PilotResult;

#[derive(Debug, Serialize)]
struct SessionRow<'a> {
    ts: i64,
    step: usize,
    description: &'a str,
}

/// Ordered, append-only record of completed steps. Each entry is one
/// human-readable description; the sequence is read-only context for future
/// decisions. Optionally mirrored to a per-session JSONL file.
pub struct StepHistory {
    pub session_id: String,
    entries: Vec<String>,
    file_path: Option<PathBuf>,
}

impl StepHistory {
    /// History with a session log under the platform data directory.
    pub fn new() -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let file_path = data_dir_or_cwd().join(format!("session_{session_id}.jsonl"));
        Self {
            session_id,
            entries: Vec::new(),
            file_path: Some(file_path),
        }
    }

    /// History without persistence.
    pub fn in_memory() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            entries: Vec::new(),
            file_path: None,
        }
    }

    pub fn push(&mut self, description: String) {
        self.entries.push(description);
        if let Err(e) = self.flush_last() {
            tracing::warn!(error = %e, "failed to flush history entry");
        }
    }

    /// Appends the latest entry to the JSONL session file.
    fn flush_last(&self) -> PilotResult<()> {
        let (Some(path), Some(last)) = (&self.file_path, self.entries.last()) else {
            return Ok(());
        };
        let row = SessionRow {
            ts: chrono::Utc::now().timestamp_millis(),
            step: self.entries.len(),
            description: last,
        };
        let line = serde_json::to_string(&row)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Numbered rendering handed to the brain model as context.
    pub fn numbered(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {entry}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for StepHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `%LOCALAPPDATA%\screenpilot\sessions` on Windows,
/// `~/.local/share/screenpilot/sessions` elsewhere, falling back to the
/// current working directory.
fn data_dir_or_cwd() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("LOCALAPPDATA").ok().map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let base = std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".local").join("share"));

    if let Some(data_dir) = base {
        let d = data_dir.join("screenpilot").join("sessions");
        let _ = std::fs::create_dir_all(&d);
        return d;
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
