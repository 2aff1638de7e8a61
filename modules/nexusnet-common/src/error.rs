use thiserror::Error;

use crate::EntityKind;

/// Everything a submission can fail with, surfaced to the caller as a
/// tagged result. Store-layer errors are classified here and never
/// swallowed.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{kind} '{name}' already exists in the database")]
    DuplicateEntity { kind: EntityKind, name: String },

    #[error("{kind} '{name}' does not exist")]
    ReferenceNotFound { kind: EntityKind, name: String },

    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Submission partially applied; completed writes: {}", completed.join(", "))]
    IncompleteSubmission { completed: Vec<String> },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl SubmissionError {
    /// Classify a raw store error. The driver error is carried verbatim
    /// in the message; nothing is retried at this layer.
    pub fn store(err: impl std::fmt::Display) -> Self {
        SubmissionError::StoreUnavailable(err.to_string())
    }

    /// Deadline expiry for a bounded store call.
    pub fn deadline(secs: u64) -> Self {
        SubmissionError::StoreUnavailable(format!("store call exceeded {secs}s deadline"))
    }
}
