use thiserror::Error;

/// Failures the suggestion engine reports to its callers.
///
/// Not finding an assignee or a project is not an error; those come back as
/// `None` in the result.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Suggestion service failed: {0}")]
    ExternalService(String),
}
