//! Per-exercise posture gate.
//!
//! Each exercise owns a fixed, ordered list of checks. Validation runs the
//! visibility gate first, then the list in order, and stops at the first
//! failure. Angle bounds are exclusive on both ends and apply to both sides.
//! Positional checks compare image y (smaller y is higher in the frame).

use std::fmt;

use crate::pose::{Features, Joint, KeypointIndex, KeypointMap, Pose};

use super::kind::ExerciseKind;

/// Human-readable cause of a failed posture check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureFault {
    ElbowAngle,
    HipAngle,
    ShoulderAngle,
    HipsNotStraight,
    ShouldersMisaligned,
    NotStandingStraight,
    WristAboveElbow,
    ElbowAboveShoulder,
    WristAboveShoulder,
    HipsBelowKnees,
    ShouldersBelowHips,
    WristNotAboveShoulder,
    WristNotAboveElbow,
    ArmsNotInward,
}

impl PostureFault {
    pub fn reason(&self) -> &'static str {
        match self {
            PostureFault::ElbowAngle => "Elbow angle incorrect",
            PostureFault::HipAngle => "Hip angle incorrect",
            PostureFault::ShoulderAngle => "Shoulder angle incorrect",
            PostureFault::HipsNotStraight => "Hips not straight",
            PostureFault::ShouldersMisaligned => "Shoulders not aligned properly",
            PostureFault::NotStandingStraight => "Not standing straight",
            PostureFault::WristAboveElbow => "Wrist is above elbow",
            PostureFault::ElbowAboveShoulder => "Elbow is above shoulder",
            PostureFault::WristAboveShoulder => "Wrist is above shoulder",
            PostureFault::HipsBelowKnees => "Hips are below knees",
            PostureFault::ShouldersBelowHips => "Shoulders are below hips",
            PostureFault::WristNotAboveShoulder => "Wrist is not above shoulder",
            PostureFault::WristNotAboveElbow => "Wrist is not above elbow",
            PostureFault::ArmsNotInward => "Arms are not facing inward",
        }
    }
}

impl fmt::Display for PostureFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Why a frame was not accepted. Never fatal to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A required landmark fell below the visibility threshold.
    MissingLandmarks {
        exercise: ExerciseKind,
        landmark: KeypointIndex,
    },
    /// An angle or positional check failed.
    PostureOutOfBounds(PostureFault),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingLandmarks { exercise, .. } => {
                write!(f, "Body parts for {} not visible", exercise)
            }
            Rejection::PostureOutOfBounds(fault) => fmt::Display::fmt(fault, f),
        }
    }
}

/// Angle measured on both sides of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairedAngle {
    Elbow,
    Shoulder,
    Hip,
}

impl PairedAngle {
    pub fn joints(&self) -> [Joint; 2] {
        match self {
            PairedAngle::Elbow => [Joint::LeftElbow, Joint::RightElbow],
            PairedAngle::Shoulder => [Joint::LeftShoulder, Joint::RightShoulder],
            PairedAngle::Hip => [Joint::LeftHip, Joint::RightHip],
        }
    }
}

/// Body part present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
}

impl BodyPart {
    /// (left, right)
    pub fn landmarks(&self) -> [KeypointIndex; 2] {
        use KeypointIndex::*;
        match self {
            BodyPart::Shoulder => [LeftShoulder, RightShoulder],
            BodyPart::Elbow => [LeftElbow, RightElbow],
            BodyPart::Wrist => [LeftWrist, RightWrist],
            BodyPart::Hip => [LeftHip, RightHip],
            BodyPart::Knee => [LeftKnee, RightKnee],
        }
    }
}

/// One entry of an exercise's check list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostureCheck {
    /// `min < angle < max` on both sides.
    AngleRange {
        angle: PairedAngle,
        min: f32,
        max: f32,
        fault: PostureFault,
    },
    /// `upper` must not sit lower in the frame than `lower` on either side.
    NotBelow {
        upper: BodyPart,
        lower: BodyPart,
        fault: PostureFault,
    },
    /// Left wrist left of left elbow, right wrist right of right elbow.
    ArmsInward,
}

impl PostureCheck {
    fn evaluate(&self, features: &Features) -> Result<(), PostureFault> {
        match *self {
            PostureCheck::AngleRange {
                angle,
                min,
                max,
                fault,
            } => {
                // NaN (undefined angle) fails both comparisons
                let in_range = angle.joints().iter().all(|&joint| {
                    let a = features.angles.get(joint);
                    min < a && a < max
                });
                if in_range {
                    Ok(())
                } else {
                    Err(fault)
                }
            }
            PostureCheck::NotBelow {
                upper,
                lower,
                fault,
            } => {
                let points = &features.keypoints;
                let ordered = upper
                    .landmarks()
                    .iter()
                    .zip(lower.landmarks().iter())
                    .all(|(&u, &l)| match (points.get(u), points.get(l)) {
                        (Some(u), Some(l)) => u.y <= l.y,
                        _ => false,
                    });
                if ordered {
                    Ok(())
                } else {
                    Err(fault)
                }
            }
            PostureCheck::ArmsInward => {
                let points = &features.keypoints;
                let left_inward = x_order(points, KeypointIndex::LeftWrist, KeypointIndex::LeftElbow);
                let right_inward =
                    x_order(points, KeypointIndex::RightElbow, KeypointIndex::RightWrist);
                if left_inward && right_inward {
                    Ok(())
                } else {
                    Err(PostureFault::ArmsNotInward)
                }
            }
        }
    }
}

/// `left` strictly left of `right` in the image.
fn x_order(points: &KeypointMap, left: KeypointIndex, right: KeypointIndex) -> bool {
    match (points.get(left), points.get(right)) {
        (Some(l), Some(r)) => l.x < r.x,
        _ => false,
    }
}

const fn range(angle: PairedAngle, min: f32, max: f32, fault: PostureFault) -> PostureCheck {
    PostureCheck::AngleRange {
        angle,
        min,
        max,
        fault,
    }
}

const fn not_below(upper: BodyPart, lower: BodyPart, fault: PostureFault) -> PostureCheck {
    PostureCheck::NotBelow {
        upper,
        lower,
        fault,
    }
}

const PUSH_UP_CHECKS: &[PostureCheck] = &[
    range(PairedAngle::Elbow, 40.0, 180.0, PostureFault::ElbowAngle),
    range(PairedAngle::Hip, 10.0, 180.0, PostureFault::HipAngle),
    range(PairedAngle::Shoulder, 0.0, 110.0, PostureFault::ShoulderAngle),
    not_below(BodyPart::Elbow, BodyPart::Wrist, PostureFault::WristAboveElbow),
    not_below(BodyPart::Shoulder, BodyPart::Elbow, PostureFault::ElbowAboveShoulder),
];

const PLANK_CHECKS: &[PostureCheck] = &[
    range(PairedAngle::Hip, 120.0, 180.0, PostureFault::HipsNotStraight),
    range(PairedAngle::Shoulder, 60.0, 120.0, PostureFault::ShouldersMisaligned),
    not_below(BodyPart::Hip, BodyPart::Knee, PostureFault::HipsBelowKnees),
    not_below(BodyPart::Shoulder, BodyPart::Hip, PostureFault::ShouldersBelowHips),
];

const HAMMER_CURL_CHECKS: &[PostureCheck] = &[
    range(PairedAngle::Elbow, 0.0, 180.0, PostureFault::ElbowAngle),
    not_below(BodyPart::Shoulder, BodyPart::Elbow, PostureFault::ElbowAboveShoulder),
    not_below(BodyPart::Shoulder, BodyPart::Wrist, PostureFault::WristAboveShoulder),
    PostureCheck::ArmsInward,
];

const TRICEP_DIP_CHECKS: &[PostureCheck] = &[
    range(PairedAngle::Elbow, 40.0, 180.0, PostureFault::ElbowAngle),
    not_below(BodyPart::Shoulder, BodyPart::Elbow, PostureFault::ElbowAboveShoulder),
    not_below(BodyPart::Elbow, BodyPart::Wrist, PostureFault::WristAboveElbow),
    PostureCheck::ArmsInward,
];

const PULL_UP_CHECKS: &[PostureCheck] = &[
    range(PairedAngle::Shoulder, 10.0, f32::INFINITY, PostureFault::ShoulderAngle),
    not_below(BodyPart::Wrist, BodyPart::Shoulder, PostureFault::WristNotAboveShoulder),
    not_below(BodyPart::Wrist, BodyPart::Elbow, PostureFault::WristNotAboveElbow),
];

const TRICEP_PULL_DOWN_CHECKS: &[PostureCheck] = &[
    range(PairedAngle::Elbow, 20.0, 170.0, PostureFault::ElbowAngle),
    PostureCheck::ArmsInward,
    range(PairedAngle::Hip, 140.0, 180.0, PostureFault::NotStandingStraight),
];

impl ExerciseKind {
    /// Ordered angle and positional checks, run after the visibility gate.
    pub fn posture_checks(&self) -> &'static [PostureCheck] {
        match self {
            ExerciseKind::PushUp => PUSH_UP_CHECKS,
            ExerciseKind::Plank => PLANK_CHECKS,
            ExerciseKind::PullUp => PULL_UP_CHECKS,
            ExerciseKind::HammerCurl => HAMMER_CURL_CHECKS,
            ExerciseKind::TricepDip => TRICEP_DIP_CHECKS,
            ExerciseKind::TricepPullDown => TRICEP_PULL_DOWN_CHECKS,
        }
    }
}

/// Posture gate. Only frames that pass it reach phase classification and counting.
#[derive(Debug, Clone)]
pub struct PostureValidator {
    kind: ExerciseKind,
    visibility_threshold: f32,
}

impl PostureValidator {
    pub fn new(kind: ExerciseKind, visibility_threshold: f32) -> Self {
        Self {
            kind,
            visibility_threshold,
        }
    }

    /// Exercise whose check list this validator runs.
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    /// Runs the visibility gate on `pose`, then the exercise's checks on
    /// `features`, and reports the first failure.
    pub fn validate(&self, pose: &Pose, features: &Features) -> Result<(), Rejection> {
        if let Some(landmark) =
            pose.first_hidden(self.kind.required_landmarks(), self.visibility_threshold)
        {
            return Err(Rejection::MissingLandmarks {
                exercise: self.kind,
                landmark,
            });
        }

        for check in self.kind.posture_checks() {
            check
                .evaluate(features)
                .map_err(Rejection::PostureOutOfBounds)?;
        }
        Ok(())
    }
}
