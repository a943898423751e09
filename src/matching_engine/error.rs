//! Error types for the rating, selection and pairing routines.
//!
//! Every check runs before any value is computed, so an `Err` always means the
//! caller's records were left exactly as they were passed in.

use thiserror::Error;

/// Errors raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A required field is missing, has the wrong type, or is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every exercise in the category was filtered out.
    #[error("no unsolved exercises found in category '{category}'")]
    NoCandidates { category: String },
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_problem() {
        let err = EngineError::invalid("student 'a' is missing elos['math']");
        assert_eq!(err.to_string(), "invalid input: student 'a' is missing elos['math']");

        let err = EngineError::NoCandidates { category: "math".into() };
        assert_eq!(err.to_string(), "no unsolved exercises found in category 'math'");
    }
}
