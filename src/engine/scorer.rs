use serde::{Deserialize, Serialize};

use crate::model::member::TeamMember;

/// Weight of one matched skill against one unit of workload.
const SKILL_WEIGHT: i64 = 10;

/// How to pick an assignee when the skill ranking alone can't decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentPolicy {
    /// Rank by skill score; no assignee without required skills.
    SkillMatch,
    /// Rank by skill score; without required skills take the least loaded
    /// active member.
    #[default]
    SkillMatchOrLeastLoaded,
    /// Ignore skills and take the active member with the fewest tasks in
    /// progress.
    LeastBusy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub member: &'a TeamMember,
    pub skill_matches: u32,
    pub workload: u32,
    pub score: i64,
}

/// Case-insensitive containment in either direction, so "script" finds
/// "javascript" and "react native" finds "react".
fn skill_overlaps(skill: &str, required: &str) -> bool {
    skill.contains(required) || required.contains(skill)
}

fn normalized(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Rank the active candidates for a set of required skills, best first.
///
/// Ties keep input order. Returns nothing when there is no active candidate or
/// no usable required skill. Takes a slice or any iterator of borrowed members.
pub fn score_candidates<'a, I>(candidates: I, required_skills: &[String]) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator<Item = &'a TeamMember>,
{
    let required = normalized(required_skills);
    if required.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .into_iter()
        .filter(|m| m.is_active())
        .map(|member| {
            let skills = normalized(&member.skills);
            let skill_matches = required
                .iter()
                .filter(|req| skills.iter().any(|s| skill_overlaps(s, req)))
                .count() as u32;
            let workload = member.workload();
            ScoredCandidate {
                member,
                skill_matches,
                workload,
                score: i64::from(skill_matches) * SKILL_WEIGHT - i64::from(workload),
            }
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Active member with the smallest value of `key`; the first one listed wins ties.
fn least_by<'a>(
    candidates: impl IntoIterator<Item = &'a TeamMember>,
    key: impl Fn(&TeamMember) -> u32,
) -> Option<&'a TeamMember> {
    candidates
        .into_iter()
        .filter(|m| m.is_active())
        .fold(None::<&TeamMember>, |best, m| match best {
            Some(b) if key(b) <= key(m) => Some(b),
            _ => Some(m),
        })
}

pub fn select_assignee<'a, I>(
    candidates: I,
    required_skills: &[String],
    policy: AssignmentPolicy,
) -> Option<&'a TeamMember>
where
    I: IntoIterator<Item = &'a TeamMember>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();
    match policy {
        AssignmentPolicy::LeastBusy => least_by(candidates, |m| m.tasks_in_progress),
        AssignmentPolicy::SkillMatch => score_candidates(candidates, required_skills)
            .first()
            .map(|c| c.member),
        AssignmentPolicy::SkillMatchOrLeastLoaded => {
            match score_candidates(candidates.clone(), required_skills).first() {
                Some(best) => Some(best.member),
                None => least_by(candidates, TeamMember::workload),
            }
        }
    }
}
