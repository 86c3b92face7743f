use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "progreso", alias = "in_progress")]
    InProgress,
    #[serde(alias = "completado", alias = "completada", alias = "done")]
    Completed,
}

/// A persisted task, as far as the reports need to know it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub name: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::util::json::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
    /// Hours. The store keeps this as either a number or a numeric string.
    #[serde(
        default,
        deserialize_with = "crate::util::json::lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_time: Option<f64>,
}
