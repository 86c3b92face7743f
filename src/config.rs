use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::estimator::HeuristicPolicy;
use crate::engine::scorer::AssignmentPolicy;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub heuristics: HeuristicPolicy,
    #[serde(default)]
    pub assignment: AssignmentConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    /// Sent as `HTTP-Referer`.
    pub site_url: Option<String>,
    /// Sent as `X-Title`.
    pub site_name: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".into(),
            model: "deepseek/deepseek-chat-v3.1:free".into(),
            timeout_secs: 20,
            temperature: 0.7,
            site_url: None,
            site_name: None,
        }
    }
}

impl LlmConfig {
    /// Key from the config file, else from `OPENROUTER_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        let usable = |k: &String| !k.trim().is_empty();
        self.api_key
            .clone()
            .filter(usable)
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(usable))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Used when suggesting a lead for a new project.
    pub project_policy: AssignmentPolicy,
    /// Used when suggesting an assignee for a task.
    pub task_policy: AssignmentPolicy,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            project_policy: AssignmentPolicy::SkillMatchOrLeastLoaded,
            task_policy: AssignmentPolicy::LeastBusy,
        }
    }
}

/// Where the roster snapshots live. Relative file names resolve against `dir`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RosterConfig {
    pub dir: Option<String>,
    pub team: Option<String>,
    pub projects: Option<String>,
    pub tasks: Option<String>,
}

impl RosterConfig {
    fn resolve(&self, file: Option<&str>, default_name: &str) -> PathBuf {
        let dir = self.dir.as_ref().map(PathBuf::from).unwrap_or_else(data_dir);
        match file {
            Some(f) if Path::new(f).is_absolute() => PathBuf::from(f),
            Some(f) => dir.join(f),
            None => dir.join(default_name),
        }
    }

    pub fn team_path(&self) -> PathBuf {
        self.resolve(self.team.as_deref(), "team.json")
    }

    pub fn projects_path(&self) -> PathBuf {
        self.resolve(self.projects.as_deref(), "projects.json")
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.resolve(self.tasks.as_deref(), "tasks.json")
    }
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pm-assist")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.llm.enabled);
        assert_eq!(config.llm.timeout_secs, 20);
        assert_eq!(config.assignment.task_policy, AssignmentPolicy::LeastBusy);
        assert_eq!(config.heuristics, HeuristicPolicy::default());
    }

    #[test]
    fn reads_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[llm]
api_key = "sk-test"
model = "some/model"
timeout_secs = 5

[heuristics]
low_keywords = ["cleanup"]
max_hours = 40

[assignment]
project_policy = "skill-match"
task_policy = "skill-match-or-least-loaded"

[roster]
dir = "/srv/snapshots"
team = "members.json"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.llm.resolved_api_key().as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "some/model");
        assert_eq!(config.llm.timeout(), Duration::from_secs(5));
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.heuristics.low_keywords, vec!["cleanup"]);
        assert_eq!(config.heuristics.max_hours, 40);
        assert_eq!(config.heuristics.min_hours, 2);
        assert_eq!(config.assignment.project_policy, AssignmentPolicy::SkillMatch);
        assert_eq!(
            config.assignment.task_policy,
            AssignmentPolicy::SkillMatchOrLeastLoaded
        );
        assert_eq!(config.roster.team_path(), PathBuf::from("/srv/snapshots/members.json"));
        assert_eq!(config.roster.projects_path(), PathBuf::from("/srv/snapshots/projects.json"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config.toml"));
    }
}
