use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "progreso", alias = "in_progress")]
    InProgress,
    #[serde(alias = "completado")]
    Completed,
}

impl ProjectStatus {
    /// Active and in-progress projects still take work.
    pub fn is_open(&self) -> bool {
        matches!(self, ProjectStatus::Active | ProjectStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    /// Names of the members working on this project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team: Vec<String>,
    /// Lead assigned when the project was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::util::json::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "crate::util::json::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_store_export() {
        let json = r#"{
            "id": "p1",
            "name": "Inventory System",
            "description": "Stock tracking for warehouses",
            "technologies": ["React", "Node"],
            "status": "progreso",
            "team": ["Ana", "Bob"],
            "assigneeName": "Ana",
            "startDate": "2024-03-01",
            "endDate": "2024-06-30"
        }"#;
        let project: ProjectDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert!(project.status.is_open());
        assert_eq!(project.team, vec!["Ana", "Bob"]);
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn completed_is_not_open() {
        let project: ProjectDescriptor =
            serde_json::from_str(r#"{"name":"Old","status":"completado"}"#).unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert!(!project.status.is_open());
        assert!(project.description.is_empty());
    }
}
