use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::ExerciseError;

/// BlazePose の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl KeypointIndex {
    pub const COUNT: usize = 33;
    pub const TRACKED_COUNT: usize = 10;

    /// 角度計算と姿勢チェックで読む 10 点（肩・肘・手首・腰・膝の左右）
    pub const TRACKED: [KeypointIndex; KeypointIndex::TRACKED_COUNT] = [
        KeypointIndex::LeftShoulder,
        KeypointIndex::LeftElbow,
        KeypointIndex::LeftWrist,
        KeypointIndex::RightShoulder,
        KeypointIndex::RightElbow,
        KeypointIndex::RightWrist,
        KeypointIndex::LeftHip,
        KeypointIndex::RightHip,
        KeypointIndex::LeftKnee,
        KeypointIndex::RightKnee,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        use KeypointIndex::*;
        const ALL: [KeypointIndex; KeypointIndex::COUNT] = [
            Nose, LeftEyeInner, LeftEye, LeftEyeOuter, RightEyeInner, RightEye, RightEyeOuter,
            LeftEar, RightEar, MouthLeft, MouthRight, LeftShoulder, RightShoulder, LeftElbow,
            RightElbow, LeftWrist, RightWrist, LeftPinky, RightPinky, LeftIndex, RightIndex,
            LeftThumb, RightThumb, LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle,
            LeftHeel, RightHeel, LeftFootIndex, RightFootIndex,
        ];
        ALL.get(index).copied()
    }

    /// `LEFT_SHOULDER` 形式の名前
    pub fn name(&self) -> &'static str {
        match self {
            KeypointIndex::LeftShoulder => "LEFT_SHOULDER",
            KeypointIndex::RightShoulder => "RIGHT_SHOULDER",
            KeypointIndex::LeftElbow => "LEFT_ELBOW",
            KeypointIndex::RightElbow => "RIGHT_ELBOW",
            KeypointIndex::LeftWrist => "LEFT_WRIST",
            KeypointIndex::RightWrist => "RIGHT_WRIST",
            KeypointIndex::LeftHip => "LEFT_HIP",
            KeypointIndex::RightHip => "RIGHT_HIP",
            KeypointIndex::LeftKnee => "LEFT_KNEE",
            KeypointIndex::RightKnee => "RIGHT_KNEE",
            _ => "UNTRACKED",
        }
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// 正規化されたX座標 (画像幅基準 0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (画像高さ基準 0.0〜1.0, 下が正)
    pub y: f32,
    /// 腰中心基準の相対深度
    #[serde(default)]
    pub z: f32,
    /// 検出信頼度 (0.0〜1.0)
    pub visibility: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// 信頼度が閾値以上か
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    /// 画像平面上の位置（z は使わない）
    pub fn position(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            visibility: 0.0,
        }
    }
}

/// 33 ランドマークからなる 1 フレーム分の姿勢
#[derive(Debug, Clone)]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    /// 推定器が返す順序付きリストから構築する
    ///
    /// 33 点未満は入力契約違反。33 点を超える分は無視する。
    pub fn from_slice(landmarks: &[Keypoint]) -> Result<Self, ExerciseError> {
        if landmarks.len() < KeypointIndex::COUNT {
            return Err(ExerciseError::LandmarkCount {
                expected: KeypointIndex::COUNT,
                got: landmarks.len(),
            });
        }
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints.copy_from_slice(&landmarks[..KeypointIndex::COUNT]);
        Ok(Self { keypoints })
    }

    /// インデックスでランドマークを取得
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    pub fn set(&mut self, index: KeypointIndex, keypoint: Keypoint) {
        self.keypoints[index as usize] = keypoint;
    }

    /// 指定ランドマークのうち信頼度が閾値を下回る最初のもの
    pub fn first_hidden(&self, indices: &[KeypointIndex], threshold: f32) -> Option<KeypointIndex> {
        indices
            .iter()
            .copied()
            .find(|&idx| !self.get(idx).is_visible(threshold))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KeypointIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_index_count() {
        assert_eq!(KeypointIndex::COUNT, 33);
        assert_eq!(KeypointIndex::RightFootIndex as usize, 32);
    }

    #[test]
    fn test_keypoint_index_from_index() {
        assert_eq!(KeypointIndex::from_index(0), Some(KeypointIndex::Nose));
        assert_eq!(KeypointIndex::from_index(11), Some(KeypointIndex::LeftShoulder));
        assert_eq!(KeypointIndex::from_index(26), Some(KeypointIndex::RightKnee));
        assert_eq!(KeypointIndex::from_index(33), None);
    }

    #[test]
    fn test_from_index_matches_discriminant() {
        for i in 0..KeypointIndex::COUNT {
            let idx = KeypointIndex::from_index(i).unwrap();
            assert_eq!(idx as usize, i);
        }
    }

    #[test]
    fn test_keypoint_is_visible() {
        let kp = Keypoint::new(0.5, 0.5, 0.0, 0.1);
        assert!(kp.is_visible(0.1));
        assert!(!kp.is_visible(0.11));
    }

    #[test]
    fn test_pose_from_slice_too_short() {
        let landmarks = vec![Keypoint::default(); 17];
        let err = Pose::from_slice(&landmarks).unwrap_err();
        assert_eq!(
            err,
            ExerciseError::LandmarkCount {
                expected: 33,
                got: 17
            }
        );
    }

    #[test]
    fn test_pose_from_slice_keeps_order() {
        let landmarks: Vec<Keypoint> = (0..33)
            .map(|i| Keypoint::new(i as f32 / 33.0, 0.5, 0.0, 1.0))
            .collect();
        let pose = Pose::from_slice(&landmarks).unwrap();
        assert_eq!(pose.get(KeypointIndex::LeftHip).x, 23.0 / 33.0);
    }

    #[test]
    fn test_first_hidden() {
        let mut pose = Pose::new([Keypoint::new(0.5, 0.5, 0.0, 0.9); KeypointIndex::COUNT]);
        let required = [KeypointIndex::LeftShoulder, KeypointIndex::LeftElbow];
        assert_eq!(pose.first_hidden(&required, 0.1), None);

        pose.set(KeypointIndex::LeftElbow, Keypoint::new(0.5, 0.5, 0.0, 0.05));
        assert_eq!(pose.first_hidden(&required, 0.1), Some(KeypointIndex::LeftElbow));
    }

    #[test]
    fn test_keypoint_deserialize_without_z() {
        let kp: Keypoint = serde_json::from_str(r#"{"x":0.25,"y":0.75,"visibility":0.9}"#).unwrap();
        assert_eq!(kp, Keypoint::new(0.25, 0.75, 0.0, 0.9));
    }
}
