use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::data_dir;
use crate::model::suggestion::{SuggestionKind, SuggestionOrigin};

/// One line of the suggestion journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: String,
    /// `suggested`, `planned` or `failed`.
    pub event: String,
    pub kind: SuggestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<SuggestionOrigin>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn log_path() -> PathBuf {
    data_dir().join("activity.jsonl")
}

pub fn append_event(event: &ActivityEvent) -> Result<()> {
    append_event_to(&log_path(), event)
}

pub fn append_event_to(path: &Path, event: &ActivityEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let line = serde_json::to_string(event)?;
    writeln!(file, "{line}")?;
    Ok(())
}

pub fn read_events(limit: Option<usize>) -> Vec<ActivityEvent> {
    read_events_from(&log_path(), limit)
}

/// The last `limit` events, oldest first. Lines that don't parse are skipped.
pub fn read_events_from(path: &Path, limit: Option<usize>) -> Vec<ActivityEvent> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut events: Vec<ActivityEvent> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    if let Some(limit) = limit {
        let len = events.len();
        if len > limit {
            events = events.split_off(len - limit);
        }
    }

    events
}

pub fn new_event(
    event_type: &str,
    kind: SuggestionKind,
    description: &str,
    origin: Option<SuggestionOrigin>,
) -> ActivityEvent {
    ActivityEvent {
        timestamp: chrono::Utc::now().to_rfc3339(),
        event: event_type.to_string(),
        kind,
        origin,
        description: description.to_string(),
        assignee: None,
        project: None,
        message: None,
    }
}
