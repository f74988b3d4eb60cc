use std::path::Path;

use crate::shared::frame::Frame;

/// Persists a surface's canvas so it can be viewed outside the process.
pub trait ImageWriter: Send + Sync {
    /// Writes a frame to the given path, optionally resizing to the given dimensions.
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
