use thiserror::Error;

use crate::scoring::ScorerError;
use crate::views::ViewKind;

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Everything that can abort a detection run.
///
/// A run either returns a fully populated table or one of these; there is
/// no partial result.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed series, timestamps, window list or configuration.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The series is too short to build `view`.
    #[error("series too short for {view} view: need more than {required} rows, got {got}")]
    InsufficientLength {
        view: ViewKind,
        required: usize,
        got: usize,
    },

    /// The scorer rejected the feature matrix of `view`.
    #[error("scoring the {view} view failed: {source}")]
    Scoring {
        view: ViewKind,
        #[source]
        source: ScorerError,
    },

    /// A scored view does not cover the source index once padded.
    #[error("{view} view misaligned: warmup + rows = {got}, series has {expected}")]
    Misaligned {
        view: ViewKind,
        expected: usize,
        got: usize,
    },
}

impl PipelineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        PipelineError::Validation {
            reason: reason.into(),
        }
    }

    /// The view the failure belongs to, if it is view-specific.
    pub fn view(&self) -> Option<ViewKind> {
        match self {
            PipelineError::Validation { .. } => None,
            PipelineError::InsufficientLength { view, .. }
            | PipelineError::Scoring { view, .. }
            | PipelineError::Misaligned { view, .. } => Some(*view),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_length_names_the_window() {
        let err = PipelineError::InsufficientLength {
            view: ViewKind::Window(7),
            required: 7,
            got: 5,
        };
        assert_eq!(
            err.to_string(),
            "series too short for window7 view: need more than 7 rows, got 5"
        );
        assert_eq!(err.view(), Some(ViewKind::Window(7)));
    }

    #[test]
    fn validation_has_no_view() {
        let err = PipelineError::validation("window sizes must be positive");
        assert!(err.view().is_none());
        assert_eq!(
            err.to_string(),
            "validation failed: window sizes must be positive"
        );
    }
}
