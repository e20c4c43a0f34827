use thiserror::Error;

/// Errors that stop a session from being created.
///
/// Per-frame problems (hidden landmarks, implausible posture) are not errors;
/// they are reported as a [`Rejection`](crate::exercise::Rejection) on the frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExerciseError {
    /// Exercise name not in the supported set.
    #[error("unknown exercise kind: {0:?}")]
    UnknownExerciseKind(String),
    /// Exercise index outside 0..=5.
    #[error("exercise index {0} out of range (expected 0..=5)")]
    ExerciseIndexOutOfRange(usize),
    /// Landmark list shorter than the pose model's fixed layout.
    #[error("expected {expected} landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}
