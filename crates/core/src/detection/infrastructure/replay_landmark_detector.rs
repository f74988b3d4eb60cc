use std::sync::Arc;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::detection::infrastructure::landmark_track::LandmarkTrack;
use crate::shared::frame::Frame;

/// Replays pre-computed landmarks by frame index.
///
/// Stands in for a live inference backend: a track recorded offline (or
/// hand-authored) drives the overlay exactly as a detector would.
pub struct ReplayLandmarkDetector {
    track: Arc<LandmarkTrack>,
}

impl ReplayLandmarkDetector {
    pub fn new(track: Arc<LandmarkTrack>) -> Self {
        Self { track }
    }
}

impl LandmarkDetector for ReplayLandmarkDetector {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<FaceLandmarks>, Box<dyn std::error::Error>> {
        Ok(self.track.get(frame.index()).cloned())
    }
}
