use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::orchestrator::{resolve_member, SuggestionContext};
use super::scorer::score_candidates;
use crate::error::SuggestError;
use crate::llm::extract::extract_json_object;
use crate::llm::prompt::{build_plan_prompt, PlanPromptInput};
use crate::llm::response::{ExternalPlan, ExternalPlannedTask};
use crate::llm::{SuggestionService, PLAN_MAX_TOKENS};
use crate::model::member::TeamMember;
use crate::model::project::ProjectDescriptor;
use crate::model::suggestion::Priority;

const DEFAULT_TASK_HOURS: u32 = 8;
const DEFAULT_DAYS_FROM_START: u64 = 7;

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub project: ProjectDescriptor,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTask {
    pub name: String,
    pub description: String,
    pub project: String,
    pub priority: Priority,
    pub estimated_hours: u32,
    pub deadline: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<TeamMember>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_skills: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectPlan {
    pub project: String,
    pub tasks: Vec<PlannedTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

fn plan_assignee(
    task: &ExternalPlannedTask,
    project: &ProjectDescriptor,
    ctx: &SuggestionContext,
) -> Option<TeamMember> {
    task.suggested_assignee
        .as_deref()
        .and_then(|name| resolve_member(&ctx.team, name, false))
        .or_else(|| {
            score_candidates(&ctx.team, &task.required_skills)
                .first()
                .filter(|best| best.skill_matches > 0)
                .map(|best| best.member)
        })
        .or_else(|| {
            project
                .assignee_name
                .as_deref()
                .and_then(|lead| resolve_member(&ctx.team, lead, false))
        })
        .cloned()
}

/// Turn the service's plan into concrete tasks. Entries without a name are
/// dropped.
pub fn build_plan(request: &PlanRequest, ctx: &SuggestionContext, external: ExternalPlan) -> ProjectPlan {
    let project = &request.project;
    let start = project.start_date.unwrap_or(ctx.today);

    let tasks = external
        .tasks
        .iter()
        .filter_map(|task| {
            let name = task.name.clone()?;
            let hours = task
                .estimated_hours
                .map(|h| h.round().min(f64::from(u32::MAX)) as u32)
                .unwrap_or(DEFAULT_TASK_HOURS);
            let days = task
                .days_from_start
                .map(|d| d.round() as u64)
                .unwrap_or(DEFAULT_DAYS_FROM_START);
            let category = task.category.clone().unwrap_or_else(|| "general".into());

            Some(PlannedTask {
                description: task.description.clone().unwrap_or_else(|| name.clone()),
                name,
                project: project.name.clone(),
                priority: task.priority.unwrap_or(Priority::Medium),
                estimated_hours: ctx.policy.clamp_hours(hours),
                deadline: start.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX),
                assignee: plan_assignee(task, project, ctx),
                required_skills: task.required_skills.clone(),
                tags: vec!["auto".into(), category.to_lowercase()],
            })
        })
        .collect();

    ProjectPlan {
        project: project.name.clone(),
        tasks,
        reasoning: external.reasoning,
    }
}

/// Ask the service for a task breakdown of a project.
///
/// Unlike single suggestions there is no local fallback: without a usable
/// plan from the service this fails with [`SuggestError::ExternalService`].
pub async fn plan_project_tasks(
    request: &PlanRequest,
    ctx: &SuggestionContext,
    service: &dyn SuggestionService,
    timeout: Duration,
) -> Result<ProjectPlan, SuggestError> {
    let project = &request.project;
    if project.name.trim().is_empty() || project.description.trim().is_empty() {
        return Err(SuggestError::InvalidInput(
            "Project name and description are required to plan tasks".into(),
        ));
    }

    let prompt = build_plan_prompt(&PlanPromptInput {
        project,
        priority: request.priority.as_str(),
        team: &ctx.team,
    });

    let reply = match tokio::time::timeout(timeout, service.complete(&prompt, PLAN_MAX_TOKENS)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            warn!(service = service.name(), error = %e, "plan request failed");
            return Err(SuggestError::ExternalService(e.to_string()));
        }
        Err(_) => {
            warn!(service = service.name(), timeout = ?timeout, "plan request timed out");
            return Err(SuggestError::ExternalService(format!(
                "{} did not answer within {}s",
                service.name(),
                timeout.as_secs()
            )));
        }
    };

    let plan = extract_json_object(&reply)
        .into_object()
        .and_then(|obj| ExternalPlan::from_object(&obj));
    let Some(plan) = plan else {
        debug!(reply = %reply, "unusable plan reply");
        return Err(SuggestError::ExternalService(
            "reply did not contain a task plan".into(),
        ));
    };

    let plan = build_plan(request, ctx, plan);
    info!(project = %plan.project, tasks = plan.tasks.len(), "planned project tasks");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::MockService;
    use crate::model::member::{MemberStatus, ProjectRefs};
    use crate::model::project::ProjectStatus;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(name: &str, skills: &[&str]) -> TeamMember {
        TeamMember {
            id: None,
            name: name.to_string(),
            role: "Developer".into(),
            department: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            status: MemberStatus::Active,
            tasks_in_progress: 0,
            projects: ProjectRefs::default(),
        }
    }

    fn request() -> PlanRequest {
        PlanRequest {
            project: ProjectDescriptor {
                id: None,
                name: "Shop".into(),
                description: "Online shop with cart and checkout".into(),
                technologies: vec!["React".into()],
                status: ProjectStatus::Active,
                team: vec![],
                assignee_name: Some("Lia".into()),
                start_date: Some(day(2024, 6, 3)),
                end_date: None,
            },
            priority: Priority::High,
        }
    }

    fn context() -> SuggestionContext {
        SuggestionContext::new(
            vec![member("Ana", &["react"]), member("Cid", &["postgres"]), member("Lia", &["management"])],
            vec![],
            day(2024, 5, 1),
        )
    }

    const REPLY: &str = r#"Sure, here is the plan:
{"tasks": [
  {"name": "Design the cart UI", "priority": "alta", "estimatedHours": 12, "daysFromStart": 2,
   "suggestedAssignee": "ana", "requiredSkills": ["react"], "category": "Design"},
  {"name": "Set up the database", "requiredSkills": ["postgres"]},
  {"name": "Write the launch notes", "suggestedAssignee": "Nobody", "estimatedHours": 500},
  {"description": "nameless step"}
],
"reasoning": "Usual order"}"#;

    #[tokio::test]
    async fn plan_from_service_reply() {
        let ctx = context();
        let service = MockService::replying(REPLY);
        let plan = plan_project_tasks(&request(), &ctx, &service, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(plan.project, "Shop");
        assert_eq!(plan.tasks.len(), 3);
        assert_eq!(plan.reasoning.as_deref(), Some("Usual order"));

        let design = &plan.tasks[0];
        assert_eq!(design.priority, Priority::High);
        assert_eq!(design.estimated_hours, 12);
        assert_eq!(design.deadline, day(2024, 6, 5));
        assert_eq!(design.assignee.as_ref().unwrap().name, "Ana");
        assert_eq!(design.tags, vec!["auto", "design"]);

        let database = &plan.tasks[1];
        assert_eq!(database.priority, Priority::Medium);
        assert_eq!(database.estimated_hours, 8);
        assert_eq!(database.deadline, day(2024, 6, 10));
        assert_eq!(database.assignee.as_ref().unwrap().name, "Cid");
        assert_eq!(database.tags, vec!["auto", "general"]);
        assert_eq!(database.description, "Set up the database");

        // Unknown name and no skills: the project lead takes it.
        let notes = &plan.tasks[2];
        assert_eq!(notes.estimated_hours, 80);
        assert_eq!(notes.assignee.as_ref().unwrap().name, "Lia");

        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].contains(r#""Shop""#));
        assert!(prompts[0].contains("Priority: high"));
    }

    #[test]
    fn plan_starts_today_without_a_start_date() {
        let ctx = context();
        let mut req = request();
        req.project.start_date = None;
        let external = ExternalPlan {
            tasks: vec![ExternalPlannedTask {
                name: Some("Kickoff".into()),
                days_from_start: Some(0.0),
                ..ExternalPlannedTask::default()
            }],
            reasoning: None,
        };
        let plan = build_plan(&req, &ctx, external);
        assert_eq!(plan.tasks[0].deadline, day(2024, 5, 1));
    }

    #[tokio::test]
    async fn missing_task_array_is_a_service_error() {
        let ctx = context();
        let service = MockService::replying(r#"{"reasoning": "no tasks today"}"#);
        let err = plan_project_tasks(&request(), &ctx, &service, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::ExternalService(_)));
    }

    #[tokio::test]
    async fn failing_service_is_a_service_error() {
        let ctx = context();
        let service = MockService::failing();
        let err = plan_project_tasks(&request(), &ctx, &service, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Mock failure"));
    }

    #[tokio::test]
    async fn project_without_description_is_rejected() {
        let ctx = context();
        let service = MockService::replying(REPLY);
        let mut req = request();
        req.project.description = " ".into();
        let err = plan_project_tasks(&req, &ctx, &service, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::InvalidInput(_)));
        assert!(service.prompts.lock().unwrap().is_empty());
    }
}
