use crate::model::project::ProjectDescriptor;

const TECHNOLOGY_WEIGHT: u32 = 3;
const NAME_WEIGHT: u32 = 2;
const DESCRIPTION_TOKEN_WEIGHT: u32 = 1;
const OPEN_STATUS_BONUS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectScore<'a> {
    pub project: &'a ProjectDescriptor,
    /// Score from the text alone, before the status bonus.
    pub relevance: u32,
    pub score: u32,
}

/// Lower-cased word tokens. Keeps `.`, `#`, `+` and `-` inside words so
/// "node.js", "c#" and "c++" survive; tokens made only of those are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '#' | '+' | '-')))
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .map(String::from)
        .collect()
}

fn score_project<'a>(text: &str, tokens: &[String], project: &'a ProjectDescriptor) -> ProjectScore<'a> {
    let mut relevance = 0;

    for tech in &project.technologies {
        let tech = tech.trim().to_lowercase();
        if !tech.is_empty() && text.contains(&tech) {
            relevance += TECHNOLOGY_WEIGHT;
        }
    }

    let name = project.name.trim().to_lowercase();
    if !name.is_empty() && tokens.iter().any(|t| name.contains(t.as_str()) || t.contains(&name)) {
        relevance += NAME_WEIGHT;
    }

    let description = project.description.to_lowercase();
    if !description.is_empty() {
        relevance += tokens
            .iter()
            .filter(|t| description.contains(t.as_str()))
            .count() as u32
            * DESCRIPTION_TOKEN_WEIGHT;
    }

    // No status bonus without a textual match.
    let score = if relevance > 0 && project.status.is_open() {
        relevance + OPEN_STATUS_BONUS
    } else {
        relevance
    };

    ProjectScore {
        project,
        relevance,
        score,
    }
}

/// Score every project against the description, in input order.
pub fn rank_projects<'a>(description: &str, projects: &'a [ProjectDescriptor]) -> Vec<ProjectScore<'a>> {
    let text = description.to_lowercase();
    let tokens = tokenize(description);
    projects
        .iter()
        .map(|p| score_project(&text, &tokens, p))
        .collect()
}

/// Best-effort pick of the project a task description belongs to.
///
/// The strictly highest score wins, so the first project listed takes ties. A
/// best score of zero is no match.
pub fn match_project<'a>(description: &str, projects: &'a [ProjectDescriptor]) -> Option<&'a ProjectDescriptor> {
    let mut best: Option<ProjectScore<'a>> = None;
    for candidate in rank_projects(description, projects) {
        if candidate.score > best.map_or(0, |b| b.score) {
            best = Some(candidate);
        }
    }
    best.map(|b| b.project)
}
