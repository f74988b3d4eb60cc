use crate::shared::frame::Frame;
use crate::shared::geometry::Rect;

/// A live video feed together with where it is shown on screen.
pub trait VideoSource: Send {
    /// The frame to process this tick, or `None` once the feed has ended.
    fn current_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// On-screen rectangle of the video at call time, in screen coordinates.
    fn screen_rect(&self) -> Rect;
}
