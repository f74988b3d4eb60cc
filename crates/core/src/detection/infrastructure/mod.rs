pub mod landmark_track;
pub mod replay_landmark_detector;
