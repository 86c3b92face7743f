use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use crate::activity::{self, ActivityEvent};
use crate::config::{self, AppConfig};
use crate::engine::orchestrator::{resolve_project, Orchestrator, SuggestionContext};
use crate::engine::planner::{plan_project_tasks, PlanRequest, ProjectPlan};
use crate::llm;
use crate::model::suggestion::{
    Priority, SuggestionKind, SuggestionOrigin, SuggestionRequest, SuggestionResult,
};
use crate::report::{build_report, Report, TimeRange};
use crate::roster::load_roster;

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestArgs {
    pub kind: SuggestionKind,
    pub description: String,
    pub priority: Option<Priority>,
    pub technologies: Vec<String>,
    pub offline: bool,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanArgs {
    pub project: String,
    pub priority: Priority,
    pub json: bool,
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    match args.get(i) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Missing value for {flag}"),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_priority(value: &str) -> Result<Priority> {
    value
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e} (expected low, medium, high or urgent)"))
}

/// Parse `pm-assist suggest` arguments.
///
/// Supported forms:
///   pm-assist suggest task Fix the login bug --priority high
///   pm-assist suggest project "Online shop" --tech react,node --json
pub fn parse_suggest_args(args: &[String]) -> Result<SuggestArgs> {
    let kind = match args.first().map(String::as_str) {
        Some("task") => SuggestionKind::Task,
        Some("project") => SuggestionKind::Project,
        _ => bail!(
            "Usage: pm-assist suggest <task|project> <description> [options]\n\nExamples:\n  pm-assist suggest task \"Fix the login bug\"\n  pm-assist suggest project \"Online shop\" --tech react,node"
        ),
    };

    let mut words: Vec<String> = Vec::new();
    let mut parsed = SuggestArgs {
        kind,
        description: String::new(),
        priority: None,
        technologies: Vec::new(),
        offline: false,
        json: false,
    };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-p" | "--priority" => {
                i += 1;
                parsed.priority = Some(parse_priority(flag_value(args, i, "--priority")?)?);
            }
            "-t" | "--tech" => {
                i += 1;
                parsed.technologies.extend(split_list(flag_value(args, i, "--tech")?));
            }
            "--offline" => parsed.offline = true,
            "--json" => parsed.json = true,
            _ => words.push(args[i].clone()),
        }
        i += 1;
    }

    parsed.description = words.join(" ");
    if parsed.description.trim().is_empty() {
        bail!("Description cannot be empty");
    }
    Ok(parsed)
}

pub fn parse_plan_args(args: &[String]) -> Result<PlanArgs> {
    let mut words: Vec<String> = Vec::new();
    let mut priority = Priority::Medium;
    let mut json = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-p" | "--priority" => {
                i += 1;
                priority = parse_priority(flag_value(args, i, "--priority")?)?;
            }
            "--json" => json = true,
            _ => words.push(args[i].clone()),
        }
        i += 1;
    }

    let project = words.join(" ");
    if project.trim().is_empty() {
        bail!("Usage: pm-assist plan <project name> [--priority <p>] [--json]");
    }
    Ok(PlanArgs { project, priority, json })
}

/// `(range, json)` for `pm-assist report`.
pub fn parse_report_args(args: &[String]) -> Result<(TimeRange, bool)> {
    let mut range = TimeRange::default();
    let mut json = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-r" | "--range" => {
                i += 1;
                range = flag_value(args, i, "--range")?.parse()?;
            }
            "--json" => json = true,
            other => bail!("Unknown argument for report: {other}"),
        }
        i += 1;
    }
    Ok((range, json))
}

pub fn parse_history_args(args: &[String]) -> Result<Option<usize>> {
    match args {
        [] => Ok(None),
        [flag, value] if flag == "-n" || flag == "--limit" => {
            let limit = value
                .parse()
                .with_context(|| format!("Invalid limit '{value}'"))?;
            Ok(Some(limit))
        }
        _ => bail!("Usage: pm-assist history [--limit <n>]"),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn record(event: &ActivityEvent) {
    if let Err(e) = activity::append_event(event) {
        warn!(error = %e, "could not write activity log");
    }
}

fn load_context(config: &AppConfig) -> Result<SuggestionContext> {
    let roster = load_roster(&config.roster)?;
    Ok(SuggestionContext::from_config(config, roster.team, roster.projects, today()))
}

pub async fn handle_suggest(args: &[String]) -> Result<()> {
    let args = parse_suggest_args(args)?;
    let config = config::load_config()?;
    let ctx = load_context(&config)?;

    let mut request = match args.kind {
        SuggestionKind::Task => SuggestionRequest::task(args.description.as_str()),
        SuggestionKind::Project => SuggestionRequest::project(args.description.as_str(), args.technologies.clone()),
    };
    if args.kind == SuggestionKind::Task {
        request.required_skills = args.technologies.clone();
    }
    if let Some(priority) = args.priority {
        request = request.with_priority(priority);
    }

    let service = if args.offline { None } else { llm::create_service(&config) };
    let mut orchestrator = Orchestrator::new(&ctx);
    if let Some(service) = &service {
        orchestrator = orchestrator.with_service(service.as_ref(), config.llm.timeout());
    }

    let result = match orchestrator.suggest(&request).await {
        Ok(result) => result,
        Err(e) => {
            let mut event = activity::new_event("failed", args.kind, &args.description, None);
            event.message = Some(e.to_string());
            record(&event);
            return Err(e.into());
        }
    };

    let mut event = activity::new_event("suggested", args.kind, &args.description, Some(result.origin));
    event.assignee = result.suggested_assignee.as_ref().map(|m| m.name.clone());
    event.project = result.suggested_project.as_ref().map(|p| p.name.clone());
    record(&event);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if service.is_some() && result.origin == SuggestionOrigin::Heuristic {
            println!("Suggestion service unavailable, showing local estimates.\n");
        }
        print_suggestion(&result);
    }
    Ok(())
}

fn print_suggestion(result: &SuggestionResult) {
    if let Some(name) = &result.name {
        println!("Name:        {name}");
    }
    if !result.technologies.is_empty() {
        println!("Stack:       {}", result.technologies.join(", "));
    }
    if let Some(p) = &result.suggested_project {
        println!("Project:     {}", p.name);
    }
    println!("Priority:    {}", result.priority);
    println!("Effort:      {}h", result.estimated_effort_hours);
    println!("Deadline:    {}", result.suggested_deadline);
    match &result.suggested_assignee {
        Some(m) if m.role.is_empty() => println!("Assignee:    {}", m.name),
        Some(m) => println!("Assignee:    {} ({})", m.name, m.role),
        None => println!("Assignee:    nobody available"),
    }
    if let Some(reasoning) = &result.reasoning {
        println!("\n{reasoning}");
    }
    println!("\n[{}]", result.origin);
}

pub async fn handle_plan(args: &[String]) -> Result<()> {
    let args = parse_plan_args(args)?;
    let config = config::load_config()?;
    let ctx = load_context(&config)?;

    let Some(project) = resolve_project(&ctx.projects, &args.project).cloned() else {
        bail!("No project matching '{}' in {}", args.project, config.roster.projects_path().display());
    };
    let Some(service) = llm::create_service(&config) else {
        bail!(
            "No suggestion service configured. Set {} or add api_key under [llm] in ~/.pm-assist/config.toml",
            config::API_KEY_ENV
        );
    };

    let request = PlanRequest {
        project,
        priority: args.priority,
    };
    let plan = plan_project_tasks(&request, &ctx, service.as_ref(), config.llm.timeout()).await;

    let mut event = activity::new_event("planned", SuggestionKind::Project, &request.project.name, None);
    event.project = Some(request.project.name.clone());
    let plan = match plan {
        Ok(plan) => {
            event.message = Some(format!("{} tasks", plan.tasks.len()));
            record(&event);
            plan
        }
        Err(e) => {
            event.event = "failed".into();
            event.message = Some(e.to_string());
            record(&event);
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &ProjectPlan) {
    println!("Plan for {} ({} tasks)\n", plan.project, plan.tasks.len());
    for (i, task) in plan.tasks.iter().enumerate() {
        let assignee = task
            .assignee
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or("unassigned");
        println!(
            "{:>2}. {} [{}] {}h, due {}, {}",
            i + 1,
            task.name,
            task.priority,
            task.estimated_hours,
            task.deadline,
            assignee
        );
        if task.description != task.name {
            println!("    {}", task.description);
        }
    }
    if let Some(reasoning) = &plan.reasoning {
        println!("\n{reasoning}");
    }
}

pub fn handle_report(args: &[String]) -> Result<()> {
    let (range, json) = parse_report_args(args)?;
    let config = config::load_config()?;
    let roster = load_roster(&config.roster)?;
    let report = build_report(range, today(), &roster.team, &roster.projects, &roster.tasks);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    let s = &report.summary;
    println!("Report ({:?})\n", report.range);
    println!("Projects completed:  {}%", s.projects_completed_pct);
    println!("Tasks completed:     {}%", s.tasks_completed_pct);
    println!("Productivity:        {}%", s.productivity);
    println!("Average task:        {:.1}h ({} days, score {})", s.avg_hours, s.avg_days, s.time_score);

    println!("\nProjects by month:");
    for m in &report.projects {
        println!("  {:<4} completed {:>3}  active {:>3}", m.label, m.completed, m.active);
    }

    println!("\nProductivity by month:");
    for m in &report.productivity {
        println!("  {:<4} {:>3}%", m.label, m.productivity);
    }

    println!("\nTeam by department:");
    if report.departments.is_empty() {
        println!("  no active members");
    }
    for d in &report.departments {
        println!("  {:<16} {:>3}%", d.name, d.percent);
    }

    let busy: Vec<_> = report.tasks.iter().filter(|d| d.completed + d.pending > 0).collect();
    println!("\nTask deadlines ({} days with tasks):", busy.len());
    for d in busy {
        println!("  {:<6} done {:>3}  open {:>3}", d.label, d.completed, d.pending);
    }
}

pub fn handle_history(args: &[String]) -> Result<()> {
    let limit = parse_history_args(args)?;
    let events = activity::read_events(limit.or(Some(20)));
    if events.is_empty() {
        println!("No activity yet.");
        return Ok(());
    }
    for e in events {
        let origin = e.origin.map(|o| format!(" [{o}]")).unwrap_or_default();
        let assignee = e.assignee.map(|a| format!(" -> {a}")).unwrap_or_default();
        let message = e.message.map(|m| format!(" ({m})")).unwrap_or_default();
        println!(
            "{}  {:<9} {:<7} {}{assignee}{origin}{message}",
            e.timestamp,
            e.event,
            e.kind.to_string(),
            e.description
        );
    }
    Ok(())
}

pub fn print_help() {
    println!("pm-assist: task and project suggestions for your team\n");
    println!("USAGE:");
    println!("  pm-assist suggest task <description>     Suggest project, priority, effort, deadline and assignee");
    println!("  pm-assist suggest project <description>  Suggest name, stack, priority, duration and lead");
    println!("  pm-assist plan <project name>            Break a project into assigned tasks");
    println!("  pm-assist report                         Summarise projects, tasks and team");
    println!("  pm-assist history                        Show recent suggestions");
    println!();
    println!("SUGGEST OPTIONS:");
    println!("  -p, --priority <p>   Use this priority instead of inferring one");
    println!("  -t, --tech <a,b>     Required skills or technologies");
    println!("      --offline        Local heuristics only");
    println!("      --json           Print the suggestion as JSON");
    println!();
    println!("PLAN OPTIONS:");
    println!("  -p, --priority <p>   Project priority (default medium)");
    println!("      --json           Print the plan as JSON");
    println!();
    println!("REPORT OPTIONS:");
    println!("  -r, --range <r>      week, month, quarter or year (default month)");
    println!("      --json           Print the report as JSON");
    println!();
    println!("HISTORY OPTIONS:");
    println!("  -n, --limit <n>      Number of entries (default 20)");
    println!();
    println!("Team, projects and tasks are read from ~/.pm-assist/{{team,projects,tasks}}.json.");
    println!("Set {} to enable the external suggestion service.", config::API_KEY_ENV);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn suggest_task_with_words() {
        let parsed = parse_suggest_args(&args(&["task", "Fix", "the", "login", "bug"])).unwrap();
        assert_eq!(parsed.kind, SuggestionKind::Task);
        assert_eq!(parsed.description, "Fix the login bug");
        assert_eq!(parsed.priority, None);
        assert!(!parsed.offline && !parsed.json);
    }

    #[test]
    fn suggest_project_with_flags() {
        let parsed = parse_suggest_args(&args(&[
            "project",
            "Online shop",
            "--tech",
            "react, node,,",
            "-p",
            "urgente",
            "--offline",
            "--json",
        ]))
        .unwrap();
        assert_eq!(parsed.kind, SuggestionKind::Project);
        assert_eq!(parsed.description, "Online shop");
        assert_eq!(parsed.technologies, vec!["react", "node"]);
        assert_eq!(parsed.priority, Some(Priority::Urgent));
        assert!(parsed.offline && parsed.json);
    }

    #[test]
    fn suggest_needs_kind_and_description() {
        assert!(parse_suggest_args(&args(&[])).is_err());
        assert!(parse_suggest_args(&args(&["story", "x"])).is_err());
        let err = parse_suggest_args(&args(&["task", "--json"])).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn suggest_rejects_bad_priority_and_missing_values() {
        let err = parse_suggest_args(&args(&["task", "x", "--priority", "asap"])).unwrap_err();
        assert!(err.to_string().contains("expected low, medium, high or urgent"));
        let err = parse_suggest_args(&args(&["task", "x", "--tech"])).unwrap_err();
        assert!(err.to_string().contains("Missing value"));
    }

    #[test]
    fn plan_args() {
        let parsed = parse_plan_args(&args(&["Inventory", "System", "--json"])).unwrap();
        assert_eq!(parsed.project, "Inventory System");
        assert_eq!(parsed.priority, Priority::Medium);
        assert!(parsed.json);
        assert!(parse_plan_args(&args(&["--priority", "high"])).is_err());
    }

    #[test]
    fn report_args() {
        assert_eq!(parse_report_args(&args(&[])).unwrap(), (TimeRange::Month, false));
        assert_eq!(
            parse_report_args(&args(&["--range", "year", "--json"])).unwrap(),
            (TimeRange::Year, true)
        );
        assert!(parse_report_args(&args(&["--range", "decade"])).is_err());
        assert!(parse_report_args(&args(&["weekly"])).is_err());
    }

    #[test]
    fn history_args() {
        assert_eq!(parse_history_args(&args(&[])).unwrap(), None);
        assert_eq!(parse_history_args(&args(&["--limit", "5"])).unwrap(), Some(5));
        assert!(parse_history_args(&args(&["--limit", "many"])).is_err());
        assert!(parse_history_args(&args(&["5"])).is_err());
    }
}
