//! Joint angles and keypoint positions derived from one frame of landmarks.
//!
//! Angles are measured in the image plane (x, y). The vertex angle between
//! the vectors to two reference joints is `acos(dot / (|u| |v|))`, with the
//! cosine clamped to [-1, 1] against floating-point overshoot.

use nalgebra::Vector2;

use super::keypoint::{KeypointIndex, Pose};

/// Limb vectors shorter than this have no direction.
const MIN_LIMB_LENGTH: f32 = 1e-6;

/// Angle at `vertex` between `vertex→a` and `vertex→b`, in degrees [0, 180].
///
/// Returns `None` when either vector is degenerate (coincident points).
pub fn joint_angle(a: Vector2<f32>, vertex: Vector2<f32>, b: Vector2<f32>) -> Option<f32> {
    let u = a - vertex;
    let v = b - vertex;

    let norm_u = u.norm();
    let norm_v = v.norm();
    if !(norm_u > MIN_LIMB_LENGTH && norm_v > MIN_LIMB_LENGTH) {
        return None;
    }

    let cos_angle = (u.dot(&v) / (norm_u * norm_v)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Named angles computed for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    RightPullUp,
}

impl Joint {
    pub const COUNT: usize = 7;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::RightPullUp,
    ];

    /// (reference a, vertex, reference b)
    pub fn triplet(&self) -> (KeypointIndex, KeypointIndex, KeypointIndex) {
        use KeypointIndex::*;
        match self {
            Joint::LeftElbow => (LeftShoulder, LeftElbow, LeftWrist),
            Joint::RightElbow => (RightShoulder, RightElbow, RightWrist),
            Joint::LeftShoulder => (LeftHip, LeftShoulder, LeftElbow),
            Joint::RightShoulder => (RightHip, RightShoulder, RightElbow),
            Joint::LeftHip => (LeftKnee, LeftHip, LeftShoulder),
            Joint::RightHip => (RightKnee, RightHip, RightShoulder),
            Joint::RightPullUp => (RightElbow, RightShoulder, LeftShoulder),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftHip => "left_hip_angle",
            Joint::RightHip => "right_hip_angle",
            Joint::RightPullUp => "right_pull_up_angle",
        }
    }
}

/// All seven joint angles of a frame, in degrees.
///
/// An angle that could not be computed is stored as NaN, so every range or
/// threshold comparison against it is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSet {
    values: [f32; Joint::COUNT],
}

impl AngleSet {
    /// Every joint at the same angle.
    ///
    /// With [`with`](Self::with) and [`with_elbows`](Self::with_elbows) this
    /// builds angle sets by hand, e.g. to replay recorded angles through
    /// [`SessionState::advance`](crate::tracker::SessionState::advance).
    pub fn uniform(degrees: f32) -> Self {
        Self {
            values: [degrees; Joint::COUNT],
        }
    }

    /// Replaces one joint's angle.
    pub fn with(mut self, joint: Joint, degrees: f32) -> Self {
        self.values[joint as usize] = degrees;
        self
    }

    /// Left and right elbow together.
    pub fn with_elbows(self, left: f32, right: f32) -> Self {
        self.with(Joint::LeftElbow, left).with(Joint::RightElbow, right)
    }

    pub fn get(&self, joint: Joint) -> f32 {
        self.values[joint as usize]
    }

    pub fn is_defined(&self, joint: Joint) -> bool {
        self.get(joint).is_finite()
    }

    /// `(joint, degrees)` for all seven joints, e.g. for logging or export.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, f32)> + '_ {
        Joint::ALL.iter().map(move |&j| (j, self.get(j)))
    }
}

/// Image-plane positions of the ten tracked keypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointMap {
    points: [Vector2<f32>; KeypointIndex::TRACKED_COUNT],
}

impl KeypointMap {
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            points: KeypointIndex::TRACKED.map(|idx| pose.get(idx).position()),
        }
    }

    /// `None` for keypoints outside the tracked set.
    pub fn get(&self, index: KeypointIndex) -> Option<Vector2<f32>> {
        KeypointIndex::TRACKED
            .iter()
            .position(|&tracked| tracked == index)
            .map(|slot| self.points[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeypointIndex, Vector2<f32>)> + '_ {
        KeypointIndex::TRACKED.iter().copied().zip(self.points.iter().copied())
    }
}

/// Feature extractor output for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub angles: AngleSet,
    pub keypoints: KeypointMap,
}

/// Computes the angle set and keypoint map. Visibility is not consulted here.
pub fn extract_features(pose: &Pose) -> Features {
    let keypoints = KeypointMap::from_pose(pose);

    let mut values = [f32::NAN; Joint::COUNT];
    for joint in Joint::ALL {
        let (a, vertex, b) = joint.triplet();
        if let Some(angle) = joint_angle(
            pose.get(a).position(),
            pose.get(vertex).position(),
            pose.get(b).position(),
        ) {
            values[joint as usize] = angle;
        }
    }

    Features {
        angles: AngleSet { values },
        keypoints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Keypoint;

    fn v(x: f32, y: f32) -> Vector2<f32> {
        Vector2::new(x, y)
    }

    #[test]
    fn test_straight_angle() {
        let angle = joint_angle(v(0.0, 0.0), v(0.5, 0.0), v(1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(v(0.0, 0.0), v(0.5, 0.0), v(0.5, 0.5)).unwrap();
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_folded_angle() {
        let angle = joint_angle(v(1.0, 0.0), v(0.0, 0.0), v(2.0, 0.0)).unwrap();
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn test_collinear_overshoot_is_clamped() {
        // rounding may push the cosine past 1; must not become NaN
        let angle = joint_angle(v(0.3, 0.3), v(0.1, 0.1), v(0.7, 0.7)).unwrap();
        assert!(angle.is_finite());
        assert!(angle.abs() < 0.1);
    }

    #[test]
    fn test_degenerate_vector() {
        assert_eq!(joint_angle(v(0.5, 0.5), v(0.5, 0.5), v(1.0, 0.0)), None);
        assert_eq!(joint_angle(v(0.0, 0.0), v(0.5, 0.5), v(0.5, 0.5)), None);
    }

    #[test]
    fn test_extract_all_angles() {
        let mut pose = Pose::default();
        let set = |pose: &mut Pose, idx, x, y| pose.set(idx, Keypoint::new(x, y, 0.0, 1.0));
        // left arm bent at a right angle, right arm straight
        set(&mut pose, KeypointIndex::LeftShoulder, 0.4, 0.3);
        set(&mut pose, KeypointIndex::LeftElbow, 0.4, 0.5);
        set(&mut pose, KeypointIndex::LeftWrist, 0.6, 0.5);
        set(&mut pose, KeypointIndex::RightShoulder, 0.6, 0.3);
        set(&mut pose, KeypointIndex::RightElbow, 0.6, 0.5);
        set(&mut pose, KeypointIndex::RightWrist, 0.6, 0.7);
        set(&mut pose, KeypointIndex::LeftHip, 0.4, 0.6);
        set(&mut pose, KeypointIndex::RightHip, 0.6, 0.6);
        set(&mut pose, KeypointIndex::LeftKnee, 0.4, 0.8);
        set(&mut pose, KeypointIndex::RightKnee, 0.6, 0.8);

        let features = extract_features(&pose);
        let angles = features.angles;
        assert!((angles.get(Joint::LeftElbow) - 90.0).abs() < 1e-3);
        assert!((angles.get(Joint::RightElbow) - 180.0).abs() < 0.1);
        assert!((angles.get(Joint::LeftHip) - 180.0).abs() < 0.1);
        // upper arm points at the hip, so the shoulder angle is 0
        assert!(angles.get(Joint::LeftShoulder).abs() < 0.1);
        assert!((angles.get(Joint::RightPullUp) - 90.0).abs() < 1e-3);
        assert!(angles.iter().all(|(_, a)| (0.0..=180.0).contains(&a)));

        let wrist = features.keypoints.get(KeypointIndex::LeftWrist).unwrap();
        assert_eq!(wrist, v(0.6, 0.5));
        assert!(features.keypoints.get(KeypointIndex::Nose).is_none());
    }

    #[test]
    fn test_extract_marks_degenerate_as_undefined() {
        // every landmark at the origin
        let features = extract_features(&Pose::default());
        for joint in Joint::ALL {
            assert!(!features.angles.is_defined(joint), "{} should be undefined", joint.name());
        }
    }

    #[test]
    fn test_angle_set_builders() {
        let angles = AngleSet::uniform(120.0).with_elbows(90.0, 150.0);
        assert_eq!(angles.get(Joint::LeftElbow), 90.0);
        assert_eq!(angles.get(Joint::RightElbow), 150.0);
        assert_eq!(angles.get(Joint::LeftHip), 120.0);
    }
}
