use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use brady_core::interfaces::ScanUiEvent;

/// Max log size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
/// Number of rotated files to keep.
const MAX_ROTATED: usize = 3;

/// Append-only session transcript in JSONL format.
///
/// Records wake events, spoken questions, backend replies, and selections,
/// so a caregiver can review what the board heard and said.
pub struct SessionLog {
    writer: BufWriter<std::fs::File>,
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    ts: String,
    kind: String,
    detail: String,
}

impl SessionLog {
    /// Open or create the session log file under `dir`.
    /// Creates parent directories if needed. Rotates past 10 MB.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join("session.jsonl");

        if path.exists() {
            if let Ok(meta) = fs::metadata(&path) {
                if meta.len() > MAX_LOG_SIZE {
                    Self::rotate(&path);
                }
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::info!("Session log: {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Default log location: `~/.brady`.
    pub fn default_dir() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".brady")
    }

    /// Rotate log files: .jsonl -> .1.jsonl -> .2.jsonl -> .3.jsonl (oldest deleted).
    fn rotate(path: &Path) {
        let stem = path.with_extension("");
        let oldest = format!("{}.{MAX_ROTATED}.jsonl", stem.display());
        let _ = fs::remove_file(&oldest);
        for i in (1..MAX_ROTATED).rev() {
            let from = format!("{}.{i}.jsonl", stem.display());
            let to = format!("{}.{}.jsonl", stem.display(), i + 1);
            let _ = fs::rename(&from, &to);
        }
        let rotated = format!("{}.1.jsonl", stem.display());
        let _ = fs::rename(path, &rotated);
    }

    /// Append one entry. Write failures are logged, never propagated — the
    /// board must not stop talking because the disk is full.
    pub fn record(&mut self, kind: &str, detail: &str) {
        let entry = LogEntry {
            ts: Utc::now().to_rfc3339(),
            kind: kind.to_string(),
            detail: detail.to_string(),
        };
        match serde_json::to_string(&entry) {
            Ok(line) => {
                if writeln!(self.writer, "{line}").is_err() || self.writer.flush().is_err() {
                    tracing::warn!("Session log write failed: {}", self.path.display());
                }
            }
            Err(e) => tracing::warn!("Session log serialize failed: {e}"),
        }
    }

    pub fn record_event(&mut self, event: &ScanUiEvent) {
        match event {
            ScanUiEvent::WakeDetected => self.record("wake", ""),
            ScanUiEvent::ListeningStarted => self.record("listening", "started"),
            ScanUiEvent::ListeningStopped => self.record("listening", "stopped"),
            ScanUiEvent::QuestionCaptured(q) => self.record("question", q),
            ScanUiEvent::OptionsReady(opts) => self.record("options", &opts.join(" | ")),
            ScanUiEvent::Highlight(_) | ScanUiEvent::Speaking(_) => {}
            ScanUiEvent::SelectionMade(text) => self.record("selection", text),
            ScanUiEvent::BackendFailed(e) => self.record("backend_error", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("brady-log-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn records_entries_as_jsonl() {
        let dir = temp_dir("basic");
        let mut log = SessionLog::open(&dir).unwrap();
        log.record("question", "what should I eat");
        log.record("selection", "Pizza");

        let content = fs::read_to_string(dir.join("session.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: LogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.kind, "question");
        assert_eq!(first.detail, "what should I eat");
    }

    #[test]
    fn reopening_appends() {
        let dir = temp_dir("append");
        {
            let mut log = SessionLog::open(&dir).unwrap();
            log.record("wake", "");
        }
        {
            let mut log = SessionLog::open(&dir).unwrap();
            log.record("wake", "");
        }
        let content = fs::read_to_string(dir.join("session.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn events_map_to_kinds() {
        let dir = temp_dir("events");
        let mut log = SessionLog::open(&dir).unwrap();
        log.record_event(&ScanUiEvent::QuestionCaptured("hi".into()));
        log.record_event(&ScanUiEvent::Highlight(3)); // not persisted
        log.record_event(&ScanUiEvent::OptionsReady(vec!["a".into(), "b".into()]));

        let content = fs::read_to_string(dir.join("session.jsonl")).unwrap();
        let kinds: Vec<String> = content
            .lines()
            .map(|l| serde_json::from_str::<LogEntry>(l).unwrap().kind)
            .collect();
        assert_eq!(kinds, vec!["question", "options"]);
    }
}
