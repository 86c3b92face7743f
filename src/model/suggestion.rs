use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::member::TeamMember;
use super::project::ProjectDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Accepts the English labels and the Spanish ones the store was seeded with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baja" => Ok(Priority::Low),
            "medium" | "media" => Ok(Priority::Medium),
            "high" | "alta" => Ok(Priority::High),
            "urgent" | "urgente" => Ok(Priority::Urgent),
            other => Err(format!("Unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Task,
    Project,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionKind::Task => f.write_str("task"),
            SuggestionKind::Project => f.write_str("project"),
        }
    }
}

/// Where the fields of a [`SuggestionResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionOrigin {
    /// Local heuristics only; the external service was skipped or failed.
    Heuristic,
    /// Every overlayable field came from the external service.
    External,
    Blended,
}

impl fmt::Display for SuggestionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionOrigin::Heuristic => f.write_str("heuristic"),
            SuggestionOrigin::External => f.write_str("external"),
            SuggestionOrigin::Blended => f.write_str("blended"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub description: String,
    pub kind: SuggestionKind,
    /// Skills or technologies the assignee should cover.
    pub required_skills: Vec<String>,
    /// Priority the caller already settled on; skips keyword inference.
    pub base_priority: Option<Priority>,
}

impl SuggestionRequest {
    pub fn task(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: SuggestionKind::Task,
            required_skills: Vec::new(),
            base_priority: None,
        }
    }

    pub fn project(description: impl Into<String>, technologies: Vec<String>) -> Self {
        Self {
            description: description.into(),
            kind: SuggestionKind::Project,
            required_skills: technologies,
            base_priority: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.base_priority = Some(priority);
        self
    }
}

/// The suggestion bundle used to pre-fill a task or project form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub suggested_assignee: Option<TeamMember>,
    pub suggested_project: Option<ProjectDescriptor>,
    pub priority: Priority,
    pub estimated_effort_hours: u32,
    pub suggested_deadline: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    pub origin: SuggestionOrigin,
}
