use std::fmt;

use serde::{Serialize, Serializer};

use crate::pose::{AngleSet, Joint};

use super::kind::ExerciseKind;

/// Phase of a repetition exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepPhase {
    Up,
    Down,
    InProgress,
    Asymmetrical,
}

/// Phase of a hold exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldPhase {
    Plank,
    NotPlank,
}

/// Classifier output. Displays as "Up", "Down", "In Progress",
/// "Asymmetrical Movement", "Plank" or "Not Plank".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Rep(RepPhase),
    Hold(HoldPhase),
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Rep(RepPhase::Up) => "Up",
            Phase::Rep(RepPhase::Down) => "Down",
            Phase::Rep(RepPhase::InProgress) => "In Progress",
            Phase::Rep(RepPhase::Asymmetrical) => "Asymmetrical Movement",
            Phase::Hold(HoldPhase::Plank) => "Plank",
            Phase::Hold(HoldPhase::NotPlank) => "Not Plank",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Phase plus the form flag raised when the reading is not a clean match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReading {
    pub phase: Phase,
    pub bad_posture: bool,
}

impl PhaseReading {
    fn rep(phase: RepPhase, bad_posture: bool) -> Self {
        Self {
            phase: Phase::Rep(phase),
            bad_posture,
        }
    }

    fn hold(phase: HoldPhase, bad_posture: bool) -> Self {
        Self {
            phase: Phase::Hold(phase),
            bad_posture,
        }
    }
}

/// One side of a band: `Below(t)` is `angle < t`, `Above(t)` is `angle > t`.
#[derive(Debug, Clone, Copy)]
enum Threshold {
    Below(f32),
    Above(f32),
}

impl Threshold {
    fn holds(self, angle: f32) -> bool {
        match self {
            Threshold::Below(t) => angle < t,
            Threshold::Above(t) => angle > t,
        }
    }
}

/// Single-limb phase with a dead zone between the two thresholds.
fn limb_phase(angle: f32, down: Threshold, up: Threshold) -> RepPhase {
    if down.holds(angle) {
        RepPhase::Down
    } else if up.holds(angle) {
        RepPhase::Up
    } else {
        RepPhase::InProgress
    }
}

/// Both elbows classified independently. Disagreement is asymmetry.
fn mirrored_elbows(angles: &AngleSet, down: Threshold, up: Threshold) -> PhaseReading {
    let left = limb_phase(angles.get(Joint::LeftElbow), down, up);
    let right = limb_phase(angles.get(Joint::RightElbow), down, up);
    if left == right {
        PhaseReading::rep(left, false)
    } else {
        PhaseReading::rep(RepPhase::Asymmetrical, true)
    }
}

fn both(angles: &AngleSet, left: Joint, right: Joint, t: Threshold) -> bool {
    t.holds(angles.get(left)) && t.holds(angles.get(right))
}

fn pull_down(angles: &AngleSet) -> PhaseReading {
    if both(angles, Joint::LeftElbow, Joint::RightElbow, Threshold::Above(130.0)) {
        PhaseReading::rep(RepPhase::Down, false)
    } else if both(angles, Joint::LeftElbow, Joint::RightElbow, Threshold::Below(80.0)) {
        PhaseReading::rep(RepPhase::Up, false)
    } else {
        PhaseReading::rep(RepPhase::InProgress, true)
    }
}

fn pull_up(angles: &AngleSet) -> PhaseReading {
    let elbows_bent = both(angles, Joint::LeftElbow, Joint::RightElbow, Threshold::Below(30.0));
    let shoulders_closed =
        both(angles, Joint::LeftShoulder, Joint::RightShoulder, Threshold::Below(50.0));

    if elbows_bent && shoulders_closed {
        PhaseReading::rep(RepPhase::Up, false)
    } else if both(angles, Joint::LeftElbow, Joint::RightElbow, Threshold::Above(150.0)) {
        PhaseReading::rep(RepPhase::Down, false)
    } else {
        PhaseReading::rep(RepPhase::InProgress, true)
    }
}

fn plank(angles: &AngleSet) -> PhaseReading {
    let straight = [Joint::LeftHip, Joint::RightHip].iter().all(|&joint| {
        let a = angles.get(joint);
        120.0 < a && a < 180.0
    });
    if straight {
        PhaseReading::hold(HoldPhase::Plank, false)
    } else {
        PhaseReading::hold(HoldPhase::NotPlank, true)
    }
}

/// Maps an angle set to the exercise's phase. Pure and deterministic.
pub fn classify(kind: ExerciseKind, angles: &AngleSet) -> PhaseReading {
    match kind {
        ExerciseKind::PushUp => {
            mirrored_elbows(angles, Threshold::Below(110.0), Threshold::Above(140.0))
        }
        ExerciseKind::HammerCurl => {
            mirrored_elbows(angles, Threshold::Above(110.0), Threshold::Below(90.0))
        }
        ExerciseKind::TricepDip => {
            mirrored_elbows(angles, Threshold::Below(110.0), Threshold::Above(130.0))
        }
        ExerciseKind::TricepPullDown => pull_down(angles),
        ExerciseKind::PullUp => pull_up(angles),
        ExerciseKind::Plank => plank(angles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elbows(left: f32, right: f32) -> AngleSet {
        AngleSet::uniform(90.0).with_elbows(left, right)
    }

    #[test]
    fn test_push_up_phases() {
        let kind = ExerciseKind::PushUp;
        assert_eq!(classify(kind, &elbows(150.0, 150.0)).phase, Phase::Rep(RepPhase::Up));
        assert_eq!(classify(kind, &elbows(90.0, 90.0)).phase, Phase::Rep(RepPhase::Down));

        // dead zone
        let reading = classify(kind, &elbows(125.0, 125.0));
        assert_eq!(reading.phase, Phase::Rep(RepPhase::InProgress));
        assert!(!reading.bad_posture);
    }

    #[test]
    fn test_push_up_asymmetry() {
        let reading = classify(ExerciseKind::PushUp, &elbows(90.0, 150.0));
        assert_eq!(reading.phase, Phase::Rep(RepPhase::Asymmetrical));
        assert!(reading.bad_posture);
        assert_eq!(reading.phase.to_string(), "Asymmetrical Movement");
    }

    #[test]
    fn test_hammer_curl_inverted_thresholds() {
        let kind = ExerciseKind::HammerCurl;
        assert_eq!(classify(kind, &elbows(60.0, 60.0)).phase, Phase::Rep(RepPhase::Up));
        assert_eq!(classify(kind, &elbows(160.0, 160.0)).phase, Phase::Rep(RepPhase::Down));
        assert_eq!(
            classify(kind, &elbows(100.0, 100.0)).phase,
            Phase::Rep(RepPhase::InProgress)
        );
    }

    #[test]
    fn test_tricep_dip_thresholds() {
        let kind = ExerciseKind::TricepDip;
        assert_eq!(classify(kind, &elbows(135.0, 135.0)).phase, Phase::Rep(RepPhase::Up));
        assert_eq!(classify(kind, &elbows(100.0, 100.0)).phase, Phase::Rep(RepPhase::Down));
        assert!(classify(kind, &elbows(100.0, 135.0)).bad_posture);
    }

    #[test]
    fn test_pull_down_in_progress_is_bad_posture() {
        let kind = ExerciseKind::TricepPullDown;
        assert_eq!(
            classify(kind, &elbows(150.0, 150.0)),
            PhaseReading::rep(RepPhase::Down, false)
        );
        assert_eq!(
            classify(kind, &elbows(60.0, 60.0)),
            PhaseReading::rep(RepPhase::Up, false)
        );
        assert_eq!(
            classify(kind, &elbows(60.0, 150.0)),
            PhaseReading::rep(RepPhase::InProgress, true)
        );
    }

    #[test]
    fn test_pull_up_needs_shoulders_for_up() {
        let kind = ExerciseKind::PullUp;
        let top = AngleSet::uniform(20.0);
        assert_eq!(classify(kind, &top).phase, Phase::Rep(RepPhase::Up));

        // elbows bent but shoulders open
        let open = top
            .with(Joint::LeftShoulder, 70.0)
            .with(Joint::RightShoulder, 70.0);
        assert_eq!(
            classify(kind, &open),
            PhaseReading::rep(RepPhase::InProgress, true)
        );

        let hang = AngleSet::uniform(170.0);
        assert_eq!(classify(kind, &hang).phase, Phase::Rep(RepPhase::Down));
    }

    #[test]
    fn test_plank_hold() {
        let hips = |l: f32, r: f32| {
            AngleSet::uniform(90.0)
                .with(Joint::LeftHip, l)
                .with(Joint::RightHip, r)
        };
        assert_eq!(
            classify(ExerciseKind::Plank, &hips(170.0, 165.0)),
            PhaseReading::hold(HoldPhase::Plank, false)
        );
        assert_eq!(
            classify(ExerciseKind::Plank, &hips(170.0, 110.0)),
            PhaseReading::hold(HoldPhase::NotPlank, true)
        );
        assert_eq!(
            classify(ExerciseKind::Plank, &hips(180.0, 180.0)).phase,
            Phase::Hold(HoldPhase::NotPlank)
        );
    }

    #[test]
    fn test_undefined_angles_never_match() {
        let angles = AngleSet::uniform(f32::NAN);
        assert_eq!(
            classify(ExerciseKind::PushUp, &angles).phase,
            Phase::Rep(RepPhase::InProgress)
        );
        assert_eq!(
            classify(ExerciseKind::Plank, &angles).phase,
            Phase::Hold(HoldPhase::NotPlank)
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let angles = AngleSet::uniform(100.0).with_elbows(105.0, 145.0);
        for kind in ExerciseKind::ALL {
            assert_eq!(classify(kind, &angles), classify(kind, &angles));
        }
    }

    #[test]
    fn test_phase_serializes_as_display_name() {
        let json = serde_json::to_string(&Phase::Rep(RepPhase::InProgress)).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }
}
