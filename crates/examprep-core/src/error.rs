//! Exam error types.
//!
//! Failures of the session state machine and scorer. Loading and configuration
//! problems outside a running session are reported through `anyhow` instead.

use thiserror::Error;

/// Errors raised by the exam core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    /// The loader produced no questions, so no exam can start.
    #[error("no questions found in the question bank")]
    EmptyQuestionBank,

    /// Review of marked questions was requested with nothing marked.
    #[error("no questions have been marked for review")]
    EmptySelection,

    /// Scoring was attempted on an exam with zero questions.
    #[error("cannot score an exam with no questions")]
    EmptyExam,

    /// A caller addressed a question position that does not exist.
    #[error("question {position} is out of range (exam has {len} questions)")]
    OutOfRangeNavigation { position: usize, len: usize },

    /// Raw input could not be turned into an answer for the question.
    #[error("invalid answer for question {}: {reason}", .position + 1)]
    InvalidInput { position: usize, reason: String },
}

impl ExamError {
    /// Returns `true` if the session can simply carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExamError::EmptySelection
                | ExamError::OutOfRangeNavigation { .. }
                | ExamError::InvalidInput { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = ExamError::OutOfRangeNavigation {
            position: 12,
            len: 10,
        };
        assert_eq!(
            err.to_string(),
            "question 12 is out of range (exam has 10 questions)"
        );
        let err = ExamError::InvalidInput {
            position: 0,
            reason: "bad".into(),
        };
        assert_eq!(err.to_string(), "invalid answer for question 1: bad");
    }

    #[test]
    fn fatal_errors_are_not_recoverable() {
        assert!(!ExamError::EmptyQuestionBank.is_recoverable());
        assert!(!ExamError::EmptyExam.is_recoverable());
        assert!(ExamError::EmptySelection.is_recoverable());
    }
}
