use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberStatus {
    #[default]
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "vacaciones", alias = "on_leave")]
    OnLeave,
    /// Also catches any status label the store hands us that we don't know.
    #[serde(other)]
    Inactive,
}

/// Projects a member is assigned to. The store has exported this both as a
/// plain counter and as a list of project references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRefs {
    Count(u32),
    List(Vec<serde_json::Value>),
}

impl ProjectRefs {
    pub fn count(&self) -> u32 {
        match self {
            ProjectRefs::Count(n) => *n,
            ProjectRefs::List(refs) => u32::try_from(refs.len()).unwrap_or(u32::MAX),
        }
    }
}

impl Default for ProjectRefs {
    fn default() -> Self {
        ProjectRefs::Count(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub tasks_in_progress: u32,
    #[serde(default)]
    pub projects: ProjectRefs,
}

impl TeamMember {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Open tasks plus assigned projects.
    pub fn workload(&self) -> u32 {
        self.tasks_in_progress.saturating_add(self.projects.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_store_export() {
        let json = r#"{
            "id": "m1",
            "name": "Ana",
            "role": "Frontend",
            "skills": ["React", "Node"],
            "status": "activo",
            "tasksInProgress": 2,
            "projects": [1, 2]
        }"#;
        let member: TeamMember = serde_json::from_str(json).unwrap();
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.tasks_in_progress, 2);
        assert_eq!(member.workload(), 4);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let member: TeamMember = serde_json::from_str(r#"{"name":"Bob"}"#).unwrap();
        assert!(member.is_active());
        assert!(member.skills.is_empty());
        assert_eq!(member.workload(), 0);
    }

    #[test]
    fn projects_as_counter() {
        let member: TeamMember =
            serde_json::from_str(r#"{"name":"Bob","tasksInProgress":1,"projects":3}"#).unwrap();
        assert_eq!(member.workload(), 4);
    }

    #[test]
    fn huge_workload_saturates() {
        let member: TeamMember =
            serde_json::from_str(r#"{"name":"Max","tasksInProgress":4294967295,"projects":[1]}"#).unwrap();
        assert_eq!(member.workload(), u32::MAX);
    }

    #[test]
    fn status_labels() {
        let parse = |s: &str| -> MemberStatus { serde_json::from_str(&format!("\"{s}\"")).unwrap() };
        assert_eq!(parse("active"), MemberStatus::Active);
        assert_eq!(parse("vacaciones"), MemberStatus::OnLeave);
        assert_eq!(parse("on-leave"), MemberStatus::OnLeave);
        assert_eq!(parse("inactive"), MemberStatus::Inactive);
        assert_eq!(parse("retired"), MemberStatus::Inactive);
    }
}
