use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::RosterConfig;
use crate::model::member::TeamMember;
use crate::model::project::ProjectDescriptor;
use crate::model::task::TaskRecord;

/// Snapshot of the records suggestions and reports are computed from.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub team: Vec<TeamMember>,
    pub projects: Vec<ProjectDescriptor>,
    pub tasks: Vec<TaskRecord>,
}

/// Read a JSON array of records. A missing file is an empty list; entries
/// that don't deserialize are skipped.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot file");
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries: Vec<Value> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), index, error = %e, "skipping malformed entry"),
        }
    }
    Ok(records)
}

pub fn load_roster(config: &RosterConfig) -> Result<Roster> {
    Ok(Roster {
        team: load_records(&config.team_path())?,
        projects: load_records(&config.projects_path())?,
        tasks: load_records(&config.tasks_path())?,
    })
}
