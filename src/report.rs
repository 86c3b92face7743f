//! Aggregations behind the `report` command: project and task throughput
//! over a time range, team distribution and an overall summary.

use anyhow::bail;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

use crate::model::member::TeamMember;
use crate::model::project::{ProjectDescriptor, ProjectStatus};
use crate::model::task::{TaskRecord, TaskStatus};

const WORKDAY_HOURS: f64 = 8.0;
/// Average task length, in days, that counts as a full time score.
const TIME_SCORE_DAYS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    /// Months shown in the monthly charts. A week still shows its month.
    pub fn months(&self) -> u32 {
        match self {
            TimeRange::Week | TimeRange::Month => 1,
            TimeRange::Quarter => 3,
            TimeRange::Year => 12,
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
            TimeRange::Year => 365,
        }
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            other => bail!("Unknown range '{other}' (expected week, month, quarter or year)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectsInMonth {
    pub label: String,
    pub completed: usize,
    pub active: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TasksOnDay {
    pub label: String,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentShare {
    pub name: String,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthProductivity {
    pub label: String,
    pub productivity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub projects_completed_pct: u32,
    pub tasks_completed_pct: u32,
    pub productivity: u32,
    pub avg_hours: f64,
    pub avg_days: f64,
    pub time_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub range: TimeRange,
    pub projects: Vec<ProjectsInMonth>,
    pub tasks: Vec<TasksOnDay>,
    pub departments: Vec<DepartmentShare>,
    pub productivity: Vec<MonthProductivity>,
    pub summary: ReportSummary,
}

fn percent(part: usize, whole: usize) -> u32 {
    (part as f64 / whole.max(1) as f64 * 100.0).round() as u32
}

fn same_month(date: Option<NaiveDate>, month: NaiveDate) -> bool {
    date.is_some_and(|d| d.year() == month.year() && d.month() == month.month())
}

/// First day of each of the last `n` months, oldest first, ending with
/// `today`'s month.
fn last_months(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    let first = today.with_day(1).unwrap_or(today);
    (0..n)
        .rev()
        .filter_map(|i| first.checked_sub_months(Months::new(i)))
        .collect()
}

/// The last `n` days, oldest first, ending with `today`.
fn last_days(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .filter_map(|i| today.checked_sub_days(Days::new(u64::from(i))))
        .collect()
}

pub fn projects_by_month(projects: &[ProjectDescriptor], range: TimeRange, today: NaiveDate) -> Vec<ProjectsInMonth> {
    last_months(today, range.months())
        .into_iter()
        .map(|month| {
            let completed = projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed && same_month(p.end_date, month))
                .count();
            let active = projects
                .iter()
                .filter(|p| p.status.is_open() && same_month(p.start_date, month))
                .count();
            ProjectsInMonth {
                label: month.format("%b").to_string(),
                completed,
                active,
                total: completed + active,
            }
        })
        .collect()
}

pub fn tasks_by_day(tasks: &[TaskRecord], range: TimeRange, today: NaiveDate) -> Vec<TasksOnDay> {
    let days = range.days();
    let label_format = if days <= 7 { "%a" } else { "%d/%m" };
    last_days(today, days)
        .into_iter()
        .map(|day| {
            let (completed, pending) = tasks
                .iter()
                .filter(|t| t.deadline == Some(day))
                .fold((0, 0), |(done, open), t| {
                    if t.status == TaskStatus::Completed {
                        (done + 1, open)
                    } else {
                        (done, open + 1)
                    }
                });
            TasksOnDay {
                label: day.format(label_format).to_string(),
                completed,
                pending,
            }
        })
        .collect()
}

/// Share of active members per department, in the order departments first
/// appear.
pub fn department_distribution(team: &[TeamMember]) -> Vec<DepartmentShare> {
    let active: Vec<&TeamMember> = team.iter().filter(|m| m.is_active()).collect();
    let mut groups: Vec<(String, usize)> = Vec::new();
    for member in &active {
        let name = member
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("Unassigned");
        match groups.iter_mut().find(|(g, _)| g == name) {
            Some((_, count)) => *count += 1,
            None => groups.push((name.to_string(), 1)),
        }
    }
    groups
        .into_iter()
        .map(|(name, count)| DepartmentShare {
            name,
            percent: percent(count, active.len()),
        })
        .collect()
}

pub fn productivity_by_month(tasks: &[TaskRecord], range: TimeRange, today: NaiveDate) -> Vec<MonthProductivity> {
    last_months(today, range.months())
        .into_iter()
        .map(|month| {
            let in_month: Vec<&TaskRecord> = tasks.iter().filter(|t| same_month(t.deadline, month)).collect();
            let completed = in_month.iter().filter(|t| t.status == TaskStatus::Completed).count();
            MonthProductivity {
                label: month.format("%b").to_string(),
                productivity: if in_month.is_empty() { 0 } else { percent(completed, in_month.len()) },
            }
        })
        .collect()
}

pub fn summary(
    projects: &[ProjectDescriptor],
    tasks: &[TaskRecord],
    productivity: &[MonthProductivity],
) -> ReportSummary {
    let projects_done = projects.iter().filter(|p| p.status == ProjectStatus::Completed).count();
    let tasks_done = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();

    let mean_productivity = if productivity.is_empty() {
        0
    } else {
        let sum: u32 = productivity.iter().map(|p| p.productivity).sum();
        (f64::from(sum) / productivity.len() as f64).round() as u32
    };

    let hours: Vec<f64> = tasks.iter().filter_map(|t| t.estimated_time).collect();
    let avg_hours = if hours.is_empty() {
        0.0
    } else {
        hours.iter().sum::<f64>() / hours.len() as f64
    };
    let avg_days = (avg_hours / WORKDAY_HOURS * 10.0).round() / 10.0;

    ReportSummary {
        projects_completed_pct: percent(projects_done, projects.len()),
        tasks_completed_pct: percent(tasks_done, tasks.len()),
        productivity: mean_productivity,
        avg_hours,
        avg_days,
        time_score: ((avg_days / TIME_SCORE_DAYS * 100.0).round() as u32).min(100),
    }
}

pub fn build_report(
    range: TimeRange,
    today: NaiveDate,
    team: &[TeamMember],
    projects: &[ProjectDescriptor],
    tasks: &[TaskRecord],
) -> Report {
    let productivity = productivity_by_month(tasks, range, today);
    Report {
        range,
        projects: projects_by_month(projects, range, today),
        tasks: tasks_by_day(tasks, range, today),
        departments: department_distribution(team),
        summary: summary(projects, tasks, &productivity),
        productivity,
    }
}
