use thiserror::Error;

/// A single field that failed strict parsing at the data boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}`: {reason}")]
pub struct ParseFailure {
    pub field:  String,
    pub reason: String,
}

impl ParseFailure {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { field: field.into(), reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum ChoreError {
    #[error("invalid chore {id}: {reason}")]
    InvalidChore { id: String, reason: String },

    #[error("no chore with id {0}")]
    UnknownChore(String),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChoreError>;
