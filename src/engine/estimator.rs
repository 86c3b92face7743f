use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::suggestion::Priority;

const MIN_EFFORT_HOURS: u32 = 2;
const MAX_EFFORT_HOURS: u32 = 80;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Keyword lists and numbers behind the task estimate. Every field can be
/// overridden from the `[heuristics]` section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicPolicy {
    pub high_keywords: Vec<String>,
    pub low_keywords: Vec<String>,
    pub implementation_keywords: Vec<String>,
    pub design_keywords: Vec<String>,
    pub urgent_hours: u32,
    pub high_hours: u32,
    pub medium_hours: u32,
    pub low_hours: u32,
    pub implementation_bonus: u32,
    pub design_bonus: u32,
    pub min_hours: u32,
    pub max_hours: u32,
    /// Effective working hours in a day.
    pub hours_per_day: u32,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            high_keywords: words(&[
                "critical", "urgent", "blocking", "payment", "security",
                "crítico", "critico", "urgente", "bloqueante", "pago", "seguridad",
            ]),
            low_keywords: words(&[
                "optimize", "improve", "refactor", "document",
                "optimizar", "mejorar", "documentar",
            ]),
            implementation_keywords: words(&[
                "implement", "integrate", "backend", "api", "authentication",
                "integrar", "autenticación",
            ]),
            design_keywords: words(&[
                "design", "ui", "ux", "layout", "responsive", "diseñ", "maquetar",
            ]),
            urgent_hours: 16,
            high_hours: 16,
            medium_hours: 8,
            low_hours: 4,
            implementation_bonus: 8,
            design_bonus: 4,
            min_hours: MIN_EFFORT_HOURS,
            max_hours: MAX_EFFORT_HOURS,
            hours_per_day: 6,
        }
    }
}

impl HeuristicPolicy {
    pub fn base_hours(&self, priority: Priority) -> u32 {
        match priority {
            Priority::Urgent => self.urgent_hours,
            Priority::High => self.high_hours,
            Priority::Medium => self.medium_hours,
            Priority::Low => self.low_hours,
        }
    }

    /// Clamp to the configured bounds, which themselves never leave
    /// [2, 80].
    pub fn clamp_hours(&self, hours: u32) -> u32 {
        let min = self.min_hours.clamp(MIN_EFFORT_HOURS, MAX_EFFORT_HOURS);
        let max = self.max_hours.clamp(min, MAX_EFFORT_HOURS);
        hours.clamp(min, max)
    }

    /// `today` plus enough workdays to burn `hours`.
    pub fn deadline_for(&self, today: NaiveDate, hours: u32) -> NaiveDate {
        let days = hours.div_ceil(self.hours_per_day.max(1));
        today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskEstimate {
    pub priority: Priority,
    pub estimated_hours: u32,
    pub deadline: NaiveDate,
}

fn mentions_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && text.contains(&k))
}

/// Priority from keywords; the first rule that matches wins.
pub fn infer_priority(description: &str, policy: &HeuristicPolicy) -> Priority {
    let text = description.to_lowercase();
    if mentions_any(&text, &policy.high_keywords) {
        Priority::High
    } else if mentions_any(&text, &policy.low_keywords) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

pub fn estimate_hours(description: &str, priority: Priority, policy: &HeuristicPolicy) -> u32 {
    let text = description.to_lowercase();
    let mut hours = policy.base_hours(priority);
    if mentions_any(&text, &policy.implementation_keywords) {
        hours += policy.implementation_bonus;
    }
    if mentions_any(&text, &policy.design_keywords) {
        hours += policy.design_bonus;
    }
    policy.clamp_hours(hours)
}

pub fn estimate_task_attributes(
    description: &str,
    base_priority: Option<Priority>,
    policy: &HeuristicPolicy,
    today: NaiveDate,
) -> TaskEstimate {
    let priority = base_priority.unwrap_or_else(|| infer_priority(description, policy));
    let estimated_hours = estimate_hours(description, priority, policy);
    TaskEstimate {
        priority,
        estimated_hours,
        deadline: policy.deadline_for(today, estimated_hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn payment_backend_is_high_and_24_hours() {
        let policy = HeuristicPolicy::default();
        let est = estimate_task_attributes(
            "Implement secure payment backend API integration",
            None,
            &policy,
            day(2024, 5, 1),
        );
        assert_eq!(est.priority, Priority::High);
        assert_eq!(est.estimated_hours, 24);
        // 24h / 6h per day = 4 days
        assert_eq!(est.deadline, day(2024, 5, 5));
    }

    #[test]
    fn high_rule_wins_over_low_rule() {
        let policy = HeuristicPolicy::default();
        assert_eq!(
            infer_priority("Refactor the critical checkout path", &policy),
            Priority::High
        );
        assert_eq!(infer_priority("Refactor the settings page", &policy), Priority::Low);
        assert_eq!(infer_priority("Add a footer", &policy), Priority::Medium);
    }

    #[test]
    fn localized_keywords() {
        let policy = HeuristicPolicy::default();
        assert_eq!(infer_priority("Error URGENTE en el pago", &policy), Priority::High);
        assert_eq!(infer_priority("Documentar el módulo", &policy), Priority::Low);
        assert_eq!(estimate_hours("Diseño de la pantalla", Priority::Medium, &policy), 12);
    }

    #[test]
    fn design_and_implementation_bonuses_stack() {
        let policy = HeuristicPolicy::default();
        let hours = estimate_hours("Implement the responsive layout", Priority::Medium, &policy);
        assert_eq!(hours, 8 + 8 + 4);
    }

    #[test]
    fn low_priority_plain_task() {
        let policy = HeuristicPolicy::default();
        let est = estimate_task_attributes("Improve copy on the FAQ", None, &policy, day(2024, 1, 1));
        assert_eq!(est.priority, Priority::Low);
        assert_eq!(est.estimated_hours, 4);
        assert_eq!(est.deadline, day(2024, 1, 2));
    }

    #[test]
    fn base_priority_skips_inference() {
        let policy = HeuristicPolicy::default();
        let est = estimate_task_attributes("Add a footer", Some(Priority::Urgent), &policy, day(2024, 1, 1));
        assert_eq!(est.priority, Priority::Urgent);
        assert_eq!(est.estimated_hours, 16);
    }

    #[test]
    fn hours_always_within_bounds() {
        let policy = HeuristicPolicy {
            low_hours: 0,
            urgent_hours: 200,
            ..HeuristicPolicy::default()
        };
        for desc in ["", "tweak", "optimize", "implement api design", "x".repeat(5000).as_str()] {
            for priority in [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent] {
                let hours = estimate_hours(desc, priority, &policy);
                assert!((2..=80).contains(&hours), "{desc:?} {priority} -> {hours}");
            }
        }
    }

    #[test]
    fn configured_bounds_stay_within_limits() {
        let policy: HeuristicPolicy = toml::from_str(
            r#"
            min_hours = 0
            max_hours = 200
            low_hours = 0
            urgent_hours = 150
            "#,
        )
        .unwrap();
        assert_eq!(estimate_hours("implement api", Priority::Urgent, &policy), 80);
        assert_eq!(estimate_hours("refactor", Priority::Low, &policy), 2);
        assert_eq!(policy.clamp_hours(0), 2);
        assert_eq!(policy.clamp_hours(500), 80);
    }

    #[test]
    fn narrower_bounds_are_kept() {
        let policy = HeuristicPolicy {
            min_hours: 4,
            max_hours: 40,
            ..HeuristicPolicy::default()
        };
        assert_eq!(policy.clamp_hours(1), 4);
        assert_eq!(policy.clamp_hours(60), 40);
        let inverted = HeuristicPolicy {
            min_hours: 50,
            max_hours: 10,
            ..HeuristicPolicy::default()
        };
        assert_eq!(inverted.clamp_hours(20), 50);
    }

    #[test]
    fn deterministic() {
        let policy = HeuristicPolicy::default();
        let today = day(2024, 2, 28);
        let a = estimate_task_attributes("Integrate SSO authentication", None, &policy, today);
        let b = estimate_task_attributes("Integrate SSO authentication", None, &policy, today);
        assert_eq!(a, b);
    }

    #[test]
    fn deadline_rounds_up_partial_days() {
        let policy = HeuristicPolicy::default();
        assert_eq!(policy.deadline_for(day(2024, 2, 28), 7), day(2024, 3, 1));
        assert_eq!(policy.deadline_for(day(2024, 2, 28), 6), day(2024, 2, 29));
    }

    #[test]
    fn partial_policy_from_toml() {
        let policy: HeuristicPolicy = toml::from_str(
            r#"
            high_keywords = ["outage"]
            hours_per_day = 8
            "#,
        )
        .unwrap();
        assert_eq!(infer_priority("Payment outage", &policy), Priority::High);
        assert_eq!(infer_priority("Payment page", &policy), Priority::Medium);
        assert_eq!(policy.max_hours, 80);
        assert_eq!(policy.hours_per_day, 8);
    }
}
