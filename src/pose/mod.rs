pub mod angles;
pub mod keypoint;

pub use angles::{extract_features, joint_angle, AngleSet, Features, Joint, KeypointMap};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
