use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExerciseError;
use crate::pose::KeypointIndex;

/// Supported exercises. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseKind {
    #[serde(rename = "Push-up")]
    PushUp,
    #[serde(rename = "Plank")]
    Plank,
    #[serde(rename = "Pull-up")]
    PullUp,
    #[serde(rename = "Hammer Curl")]
    HammerCurl,
    #[serde(rename = "Tricep Dip")]
    TricepDip,
    #[serde(rename = "Tricep Pull-down")]
    TricepPullDown,
}

/// How phase changes turn into progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingRule {
    /// Count when "Down" is reached, re-arm on "Up" (push-up, dip, pull-down).
    CountOnDown,
    /// Arm on "Up", count on the return to "Down" (curl, pull-up).
    CountOnReturn,
    /// Time spent in the hold phase (plank).
    Hold,
}

impl ExerciseKind {
    /// Index order used by exercise selection (0..=5).
    pub const ALL: [ExerciseKind; 6] = [
        ExerciseKind::PushUp,
        ExerciseKind::Plank,
        ExerciseKind::PullUp,
        ExerciseKind::HammerCurl,
        ExerciseKind::TricepDip,
        ExerciseKind::TricepPullDown,
    ];

    pub fn from_index(index: usize) -> Result<Self, ExerciseError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ExerciseError::ExerciseIndexOutOfRange(index))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExerciseKind::PushUp => "Push-up",
            ExerciseKind::Plank => "Plank",
            ExerciseKind::PullUp => "Pull-up",
            ExerciseKind::HammerCurl => "Hammer Curl",
            ExerciseKind::TricepDip => "Tricep Dip",
            ExerciseKind::TricepPullDown => "Tricep Pull-down",
        }
    }

    /// Landmarks that must be visible before any posture check runs.
    pub fn required_landmarks(&self) -> &'static [KeypointIndex] {
        use KeypointIndex::*;
        match self {
            ExerciseKind::PushUp => &[LeftShoulder, LeftElbow, LeftWrist, LeftHip, LeftKnee],
            ExerciseKind::Plank => &[LeftShoulder, RightShoulder, LeftHip, RightHip, LeftKnee, RightKnee],
            ExerciseKind::HammerCurl | ExerciseKind::TricepDip | ExerciseKind::TricepPullDown => {
                &[LeftShoulder, LeftElbow, LeftWrist, LeftHip, RightHip]
            }
            ExerciseKind::PullUp => &[LeftShoulder, LeftElbow, LeftWrist],
        }
    }

    /// Average burn rate in kcal per minute.
    pub fn burn_rate(&self) -> f32 {
        match self {
            ExerciseKind::PushUp => 7.0,
            ExerciseKind::Plank => 4.0,
            ExerciseKind::PullUp => 8.0,
            ExerciseKind::HammerCurl => 5.0,
            ExerciseKind::TricepDip => 6.0,
            ExerciseKind::TricepPullDown => 6.0,
        }
    }

    pub fn counting_rule(&self) -> CountingRule {
        match self {
            ExerciseKind::PushUp | ExerciseKind::TricepDip | ExerciseKind::TricepPullDown => {
                CountingRule::CountOnDown
            }
            ExerciseKind::HammerCurl | ExerciseKind::PullUp => CountingRule::CountOnReturn,
            ExerciseKind::Plank => CountingRule::Hold,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExerciseKind {
    type Err = ExerciseError;

    /// Accepts display names ("Tricep Pull-down") and identifiers
    /// ("tricep_pull_down", "tricep-pull-down"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.name()
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-'))
                    .map(|c| c.to_ascii_lowercase())
                    .eq(normalized.chars())
            })
            .ok_or_else(|| ExerciseError::UnknownExerciseKind(s.to_string()))
    }
}
