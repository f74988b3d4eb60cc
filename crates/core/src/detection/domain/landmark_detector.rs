use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;

/// Domain interface for single-face landmark detection.
///
/// `Ok(None)` means no face was found in the frame, which is a normal
/// outcome. Implementations may be stateful, hence `&mut self`; callers
/// issue one call at a time.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame)
        -> Result<Option<FaceLandmarks>, Box<dyn std::error::Error>>;
}
