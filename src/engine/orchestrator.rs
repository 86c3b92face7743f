use chrono::{Days, NaiveDate};
use std::time::Duration;
use tracing::{debug, warn};

use super::estimator::{estimate_task_attributes, HeuristicPolicy};
use super::matcher::match_project;
use super::scorer::{score_candidates, select_assignee, AssignmentPolicy};
use crate::config::AppConfig;
use crate::error::SuggestError;
use crate::llm::extract::{extract_json_object, JsonExtract};
use crate::llm::prompt::{build_project_prompt, build_task_prompt};
use crate::llm::response::ExternalSuggestion;
use crate::llm::{SuggestionService, SUGGESTION_MAX_TOKENS};
use crate::model::member::TeamMember;
use crate::model::project::ProjectDescriptor;
use crate::model::suggestion::{SuggestionKind, SuggestionOrigin, SuggestionRequest, SuggestionResult};

/// Everything a suggestion is computed from, passed in explicitly.
#[derive(Debug, Clone)]
pub struct SuggestionContext {
    pub team: Vec<TeamMember>,
    pub projects: Vec<ProjectDescriptor>,
    pub policy: HeuristicPolicy,
    pub project_policy: AssignmentPolicy,
    pub task_policy: AssignmentPolicy,
    /// Day deadlines are counted from, in the caller's calendar.
    pub today: NaiveDate,
}

impl SuggestionContext {
    pub fn new(team: Vec<TeamMember>, projects: Vec<ProjectDescriptor>, today: NaiveDate) -> Self {
        Self {
            team,
            projects,
            policy: HeuristicPolicy::default(),
            project_policy: AssignmentPolicy::SkillMatchOrLeastLoaded,
            task_policy: AssignmentPolicy::LeastBusy,
            today,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        team: Vec<TeamMember>,
        projects: Vec<ProjectDescriptor>,
        today: NaiveDate,
    ) -> Self {
        Self {
            policy: config.heuristics.clone(),
            project_policy: config.assignment.project_policy,
            task_policy: config.assignment.task_policy,
            ..Self::new(team, projects, today)
        }
    }
}

/// Active roster member whose name (or, optionally, role) contains `query`.
pub fn resolve_member<'a>(team: &'a [TeamMember], query: &str, match_role: bool) -> Option<&'a TeamMember> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    team.iter().filter(|m| m.is_active()).find(|m| {
        m.name.to_lowercase().contains(&q) || (match_role && m.role.to_lowercase().contains(&q))
    })
}

/// Project whose name contains `query`.
pub fn resolve_project<'a>(projects: &'a [ProjectDescriptor], query: &str) -> Option<&'a ProjectDescriptor> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    projects.iter().find(|p| p.name.to_lowercase().contains(&q))
}

/// Members listed on the project's team, or the whole roster when the project
/// has no usable team.
fn team_for<'a>(team: &'a [TeamMember], project: Option<&ProjectDescriptor>) -> Vec<&'a TeamMember> {
    let scoped: Vec<&TeamMember> = match project {
        Some(p) if !p.team.is_empty() => team
            .iter()
            .filter(|m| p.team.iter().any(|n| n.trim().eq_ignore_ascii_case(m.name.trim())))
            .collect(),
        _ => Vec::new(),
    };
    if scoped.is_empty() {
        team.iter().collect()
    } else {
        scoped
    }
}

pub struct Orchestrator<'a> {
    context: &'a SuggestionContext,
    service: Option<&'a dyn SuggestionService>,
    timeout: Duration,
}

impl<'a> Orchestrator<'a> {
    pub fn new(context: &'a SuggestionContext) -> Self {
        Self {
            context,
            service: None,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_service(mut self, service: &'a dyn SuggestionService, timeout: Duration) -> Self {
        self.service = Some(service);
        self.timeout = timeout;
        self
    }

    /// Pick for a task from the project's team, under the task policy.
    fn task_assignee(&self, project: Option<&ProjectDescriptor>, required_skills: &[String]) -> Option<TeamMember> {
        let ctx = self.context;
        let scoped = team_for(&ctx.team, project);
        select_assignee(scoped.iter().copied(), required_skills, ctx.task_policy).cloned()
    }

    /// Suggestion from the local heuristics alone.
    pub fn suggest_local(&self, request: &SuggestionRequest) -> Result<SuggestionResult, SuggestError> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(SuggestError::InvalidInput(
                "Enter a description to generate suggestions".into(),
            ));
        }

        let ctx = self.context;
        let estimate = estimate_task_attributes(description, request.base_priority, &ctx.policy, ctx.today);
        let mut reasons = vec![format!(
            "{} priority, {}h at {}h per day",
            estimate.priority, estimate.estimated_hours, ctx.policy.hours_per_day
        )];

        let (project, assignee) = match request.kind {
            SuggestionKind::Task => {
                let project = match_project(description, &ctx.projects);
                let assignee = self.task_assignee(project, &request.required_skills);
                if let Some(p) = project {
                    reasons.push(format!("matches project {}", p.name));
                }
                (project.cloned(), assignee)
            }
            SuggestionKind::Project => {
                let assignee =
                    select_assignee(&ctx.team, &request.required_skills, ctx.project_policy).cloned();
                (None, assignee)
            }
        };

        if let Some(m) = &assignee {
            let score = score_candidates(std::slice::from_ref(m), &request.required_skills)
                .first()
                .map(|c| c.skill_matches)
                .unwrap_or(0);
            reasons.push(format!(
                "{} has {} matching skills and {} open tasks",
                m.name, score, m.tasks_in_progress
            ));
        }

        Ok(SuggestionResult {
            suggested_assignee: assignee,
            suggested_project: project,
            priority: estimate.priority,
            estimated_effort_hours: estimate.estimated_hours,
            suggested_deadline: estimate.deadline,
            reasoning: Some(reasons.join("; ")),
            name: None,
            technologies: Vec::new(),
            origin: SuggestionOrigin::Heuristic,
        })
    }

    /// Heuristic suggestion, overlaid with the external service's answer when
    /// one is configured and answers in time with usable JSON.
    ///
    /// The external service can never make this fail: any problem with it
    /// leaves the heuristic result in place.
    pub async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResult, SuggestError> {
        let local = self.suggest_local(request)?;
        let Some(service) = self.service else {
            return Ok(local);
        };

        let ctx = self.context;
        let prompt = match request.kind {
            SuggestionKind::Task => {
                build_task_prompt(&request.description, &ctx.projects, &ctx.team, ctx.today)
            }
            SuggestionKind::Project => build_project_prompt(&request.description, &ctx.team),
        };

        let reply = match tokio::time::timeout(self.timeout, service.complete(&prompt, SUGGESTION_MAX_TOKENS)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(service = service.name(), error = %e, "suggestion service failed, using heuristics");
                return Ok(local);
            }
            Err(_) => {
                warn!(service = service.name(), timeout = ?self.timeout, "suggestion service timed out, using heuristics");
                return Ok(local);
            }
        };

        let obj = match extract_json_object(&reply) {
            JsonExtract::Object(obj) => obj,
            JsonExtract::Unparseable => {
                warn!(service = service.name(), "no JSON object in suggestion reply, using heuristics");
                debug!(reply = %reply, "unparseable suggestion reply");
                return Ok(local);
            }
        };

        let external = ExternalSuggestion::from_object(&obj);
        if external.is_empty() {
            warn!(service = service.name(), "suggestion reply had no usable fields, using heuristics");
            return Ok(local);
        }
        Ok(self.blend(request, local, &external))
    }

    /// Overlay the external fields on the local result, field by field.
    pub fn blend(
        &self,
        request: &SuggestionRequest,
        local: SuggestionResult,
        external: &ExternalSuggestion,
    ) -> SuggestionResult {
        let ctx = self.context;
        let kind = request.kind;
        let mut result = local;
        let mut applied = 0usize;
        let mut kept = 0usize;
        let mut tally = |used: bool, relevant: bool| match (used, relevant) {
            (true, _) => applied += 1,
            (false, true) => kept += 1,
            (false, false) => {}
        };

        if let Some(name) = &external.name {
            result.name = Some(name.clone());
        }
        tally(external.name.is_some(), kind == SuggestionKind::Project);

        if let Some(techs) = &external.technologies {
            result.technologies = techs.clone();
        }
        tally(external.technologies.is_some(), kind == SuggestionKind::Project);

        if let Some(priority) = external.priority {
            result.priority = priority;
        }
        tally(external.priority.is_some(), true);

        let mut hours_changed = false;
        if let Some(hours) = external.estimated_hours {
            let hours = ctx.policy.clamp_hours(hours.round().min(f64::from(u32::MAX)) as u32);
            hours_changed = hours != result.estimated_effort_hours;
            result.estimated_effort_hours = hours;
        }
        tally(external.estimated_hours.is_some(), kind == SuggestionKind::Task);

        let deadline = external
            .deadline
            .filter(|d| *d >= ctx.today)
            .or_else(|| {
                external.estimated_duration_days.and_then(|days| {
                    ctx.today.checked_add_days(Days::new(days.round() as u64))
                })
            });
        match deadline {
            Some(d) => result.suggested_deadline = d,
            None if hours_changed => {
                result.suggested_deadline = ctx.policy.deadline_for(ctx.today, result.estimated_effort_hours);
            }
            None => {}
        }
        tally(deadline.is_some(), true);

        let mut project_changed = false;
        if kind == SuggestionKind::Task {
            let project = external
                .suggested_project
                .as_deref()
                .and_then(|q| resolve_project(&ctx.projects, q));
            if let Some(p) = project {
                project_changed = result.suggested_project.as_ref() != Some(p);
                result.suggested_project = Some(p.clone());
            }
            tally(project.is_some(), true);
        }

        let assignee = external
            .suggested_assignee
            .as_deref()
            .and_then(|q| resolve_member(&ctx.team, q, kind == SuggestionKind::Project));
        match assignee {
            Some(m) => result.suggested_assignee = Some(m.clone()),
            None if kind == SuggestionKind::Task && project_changed => {
                // The local pick came from the other project's team.
                result.suggested_assignee =
                    self.task_assignee(result.suggested_project.as_ref(), &request.required_skills);
            }
            None if kind == SuggestionKind::Project
                && request.required_skills.is_empty()
                && !result.technologies.is_empty() =>
            {
                // Technologies only arrived with the reply; rank again with them.
                if let Some(m) = select_assignee(&ctx.team, &result.technologies, ctx.project_policy) {
                    result.suggested_assignee = Some(m.clone());
                }
            }
            None => {}
        }
        tally(assignee.is_some(), true);

        if let Some(reasoning) = &external.reasoning {
            result.reasoning = Some(reasoning.clone());
        }

        result.origin = match (applied, kept) {
            (0, _) => SuggestionOrigin::Heuristic,
            (_, 0) => SuggestionOrigin::External,
            _ => SuggestionOrigin::Blended,
        };
        result
    }
}
