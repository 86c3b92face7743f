//! Lenient readers for the JSON the suggestion service answers with.
//!
//! No field is required. A field that is missing or has the wrong shape reads
//! as `None`, so callers can fall back field by field.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::model::suggestion::Priority;
use crate::util::json::{date_from_str, number_field, string_field, string_list_field};

/// Models answer "null" or "N/A" in a string when they mean no one.
fn name_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    string_field(obj, key).filter(|s| {
        !matches!(
            s.to_lowercase().as_str(),
            "null" | "none" | "n/a" | "ninguno" | "-"
        )
    })
}

fn priority_field(obj: &Map<String, Value>, key: &str) -> Option<Priority> {
    string_field(obj, key).and_then(|s| s.parse().ok())
}

fn positive_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    number_field(obj, key).filter(|n| *n > 0.0)
}

fn date_field(obj: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    string_field(obj, key).and_then(|s| date_from_str(&s))
}

/// Fields of a single task or project suggestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalSuggestion {
    pub name: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<f64>,
    /// Project length in days.
    pub estimated_duration_days: Option<f64>,
    pub suggested_assignee: Option<String>,
    pub suggested_project: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub reasoning: Option<String>,
}

impl ExternalSuggestion {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            name: string_field(obj, "name"),
            technologies: string_list_field(obj, "technologies").filter(|t| !t.is_empty()),
            priority: priority_field(obj, "priority"),
            estimated_hours: positive_field(obj, "estimatedHours"),
            estimated_duration_days: positive_field(obj, "estimatedDuration"),
            suggested_assignee: name_field(obj, "suggestedAssignee"),
            suggested_project: name_field(obj, "suggestedProject"),
            deadline: date_field(obj, "deadline"),
            reasoning: string_field(obj, "reasoning"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One task of a generated project plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalPlannedTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<f64>,
    pub days_from_start: Option<f64>,
    pub suggested_assignee: Option<String>,
    pub required_skills: Vec<String>,
    pub category: Option<String>,
}

impl ExternalPlannedTask {
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            name: string_field(obj, "name"),
            description: string_field(obj, "description"),
            priority: priority_field(obj, "priority"),
            estimated_hours: positive_field(obj, "estimatedHours"),
            days_from_start: number_field(obj, "daysFromStart").filter(|n| *n >= 0.0),
            suggested_assignee: name_field(obj, "suggestedAssignee"),
            required_skills: string_list_field(obj, "requiredSkills").unwrap_or_default(),
            category: string_field(obj, "category"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPlan {
    pub tasks: Vec<ExternalPlannedTask>,
    pub reasoning: Option<String>,
}

impl ExternalPlan {
    /// `None` unless the object carries a `tasks` array.
    pub fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        let tasks = obj
            .get("tasks")?
            .as_array()?
            .iter()
            .filter_map(Value::as_object)
            .map(ExternalPlannedTask::from_object)
            .collect();
        Some(Self {
            tasks,
            reasoning: string_field(obj, "reasoning"),
        })
    }
}
