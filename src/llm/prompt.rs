use chrono::NaiveDate;

use crate::model::member::TeamMember;
use crate::model::project::ProjectDescriptor;

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn team_lines(team: &[TeamMember]) -> String {
    team.iter()
        .filter(|m| m.is_active())
        .map(|m| {
            format!(
                "- {} ({}) - skills: {} - tasks in progress: {}",
                m.name,
                if m.role.is_empty() { "n/a" } else { m.role.as_str() },
                join_or(&m.skills, "n/a"),
                m.tasks_in_progress
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn team_section(team: &[TeamMember]) -> String {
    let lines = team_lines(team);
    if lines.is_empty() {
        "\n\nNo team members are available for assignment.".to_string()
    } else {
        format!("\n\nAvailable team:\n{lines}")
    }
}

pub fn build_task_prompt(
    description: &str,
    projects: &[ProjectDescriptor],
    team: &[TeamMember],
    today: NaiveDate,
) -> String {
    let projects = if projects.is_empty() {
        String::new()
    } else {
        let list = projects
            .iter()
            .map(|p| format!("- {} ({})", p.name, join_or(&p.technologies, "n/a")))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\nAvailable projects:\n{list}")
    };

    format!(
        r#"You are an expert in managing software development work. Based on this task description: "{description}"{projects}{team}

Today is {today}.

Answer with suggestions as JSON with exactly this structure:
{{
  "suggestedProject": "name of the most relevant project, if any are listed",
  "priority": "low|medium|high|urgent",
  "estimatedHours": number_of_hours,
  "suggestedAssignee": "name of the best team member, if any are listed",
  "deadline": "suggested date as YYYY-MM-DD, on or after {today}",
  "reasoning": "short explanation of the choices"
}}

Consider:
- The most relevant project by technologies and context
- Priority from keywords (critical, urgent, blocking...)
- Realistic hours for the complexity (2-80 hours)
- The team member with the lowest current workload
- A deadline based on priority and complexity

Reply ONLY with valid JSON, no extra text."#,
        team = team_section(team),
    )
}

pub fn build_project_prompt(description: &str, team: &[TeamMember]) -> String {
    format!(
        r#"You are an expert software project manager. Based on this project description: "{description}"{team}

Answer with suggestions as JSON with exactly this structure:
{{
  "name": "suggested project name",
  "technologies": ["tech1", "tech2", "tech3"],
  "priority": "low|medium|high|urgent",
  "estimatedDuration": number_of_days,
  "suggestedAssignee": "name of the best team member to lead it, if any are listed",
  "reasoning": "short explanation of the choices"
}}

Consider:
- Modern technologies that fit this kind of project
- Priority from keywords (urgent, critical...)
- A realistic duration for the complexity
- The best team member by skills

Reply ONLY with valid JSON, no extra text."#,
        team = team_section(team),
    )
}

pub struct PlanPromptInput<'a> {
    pub project: &'a ProjectDescriptor,
    pub priority: &'a str,
    pub team: &'a [TeamMember],
}

pub fn build_plan_prompt(input: &PlanPromptInput<'_>) -> String {
    let project = input.project;
    let timeline = match (project.start_date, project.end_date) {
        (Some(start), Some(end)) => format!("\n- Dates: {start} to {end}"),
        _ => String::new(),
    };
    let techs = if project.technologies.is_empty() {
        String::new()
    } else {
        format!("\n- Technologies: {}", project.technologies.join(", "))
    };

    format!(
        r#"You are an expert software project manager. Analyse this project and plan specific, realistic tasks.

PROJECT:
- Name: "{name}"
- Description: "{description}"
- Priority: {priority}{techs}{timeline}{team}

Answer with a task plan as JSON with exactly this structure:
{{
  "tasks": [
    {{
      "name": "specific task name",
      "description": "what has to be done",
      "priority": "low|medium|high|urgent",
      "estimatedHours": number_of_hours,
      "daysFromStart": days_after_project_start,
      "suggestedAssignee": "name of the best team member or null",
      "requiredSkills": ["skill1", "skill2"],
      "category": "planning|design|frontend|backend|testing|deployment|documentation"
    }}
  ],
  "reasoning": "short explanation of the plan and assignments"
}}

Instructions:
1. Plan 5-8 specific tasks for this kind of project
2. Assign each task to the best team member by skills and current workload
3. Follow the usual order: planning, design, development, testing, deployment
4. Set priorities by how critical each phase is
5. Estimate realistic hours for the complexity
6. Use null for suggestedAssignee when nobody fits

Reply ONLY with valid JSON, no extra text."#,
        name = project.name,
        description = project.description,
        priority = input.priority,
        team = team_section(input.team),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::member::{MemberStatus, ProjectRefs};
    use crate::model::project::ProjectStatus;

    fn ana() -> TeamMember {
        TeamMember {
            id: None,
            name: "Ana".into(),
            role: "Frontend".into(),
            department: None,
            skills: vec!["React".into(), "CSS".into()],
            status: MemberStatus::Active,
            tasks_in_progress: 2,
            projects: ProjectRefs::default(),
        }
    }

    #[test]
    fn task_prompt_lists_projects_and_team() {
        let project = ProjectDescriptor {
            id: None,
            name: "Inventory System".into(),
            description: String::new(),
            technologies: vec!["React".into()],
            status: ProjectStatus::Active,
            team: vec![],
            assignee_name: None,
            start_date: None,
            end_date: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let prompt = build_task_prompt("Fix login", &[project], &[ana()], today);
        assert!(prompt.contains(r#""Fix login""#));
        assert!(prompt.contains("- Inventory System (React)"));
        assert!(prompt.contains("- Ana (Frontend) - skills: React, CSS - tasks in progress: 2"));
        assert!(prompt.contains(r#""estimatedHours""#));
        assert!(prompt.contains("Today is 2024-05-01."));
        assert!(prompt.contains("on or after 2024-05-01"));
    }

    #[test]
    fn inactive_members_are_left_out() {
        let mut away = ana();
        away.status = MemberStatus::OnLeave;
        let prompt = build_project_prompt("Shop", &[away]);
        assert!(!prompt.contains("Ana"));
        assert!(prompt.contains("No team members are available"));
    }
}
