use std::time::Duration;

use crate::shared::geometry::Size;
use crate::shared::region_name::RegionName;

/// Upper bound on simultaneously live region surfaces.
pub const MAX_SURFACES: usize = 10;

/// Age at which the eviction sweep closes a surface.
pub const SURFACE_TTL: Duration = Duration::from_millis(10_000);

pub const RENDER_PERIOD: Duration = Duration::from_millis(100);
pub const EVICTION_PERIOD: Duration = Duration::from_millis(1_000);

/// Pixels added on every side of a region's landmark bounding box.
pub const CROP_PADDING: f64 = 20.0;

/// Base length of the mosaic arrangement, in screen pixels.
pub const MOSAIC_UNIT: f64 = 150.0;

/// Number of points in the landmark schema (jaw, brows, nose, eyes, mouth).
pub const LANDMARK_COUNT: usize = 68;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Fixed drawable size of each region's surface.
///
/// Ears and chin have no dedicated size and use the 100x100 fallback.
pub fn output_size(name: RegionName) -> Size {
    match name {
        RegionName::LeftEyebrow | RegionName::RightEyebrow => Size::new(120, 50),
        RegionName::LeftEye | RegionName::RightEye => Size::new(120, 70),
        RegionName::Nose => Size::new(100, 120),
        RegionName::Mouth => Size::new(200, 70),
        RegionName::LeftEar | RegionName::RightEar | RegionName::Chin => Size::new(100, 100),
    }
}
