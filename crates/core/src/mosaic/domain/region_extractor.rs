//! Maps a landmark set onto the fixed named facial regions.

use std::collections::BTreeMap;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::constants::output_size;
use crate::shared::geometry::{Point, Size};
use crate::shared::region_name::RegionName;

/// One facial region for one detection tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FacialRegion {
    pub name: RegionName,
    pub points: Vec<Point>,
    pub output_size: Size,
}

/// Regions keyed (and therefore iterated) in `RegionName` order.
pub type RegionMap = BTreeMap<RegionName, FacialRegion>;

/// Derives all nine regions from a detection, or none when no face was
/// found.
///
/// Ears use the first and last three jaw points; the chin uses the middle
/// jaw slice 6..11.
pub fn extract_regions(landmarks: Option<&FaceLandmarks>) -> RegionMap {
    let Some(lm) = landmarks else {
        return RegionMap::new();
    };
    let jaw = lm.jaw_outline();

    RegionName::ALL
        .into_iter()
        .map(|name| {
            let points: &[Point] = match name {
                RegionName::LeftEyebrow => lm.left_eyebrow(),
                RegionName::RightEyebrow => lm.right_eyebrow(),
                RegionName::LeftEye => lm.left_eye(),
                RegionName::RightEye => lm.right_eye(),
                RegionName::Nose => lm.nose(),
                RegionName::Mouth => lm.mouth(),
                RegionName::LeftEar => &jaw[..3],
                RegionName::RightEar => &jaw[jaw.len() - 3..],
                RegionName::Chin => &jaw[6..11],
            };
            let region = FacialRegion {
                name,
                points: points.to_vec(),
                output_size: output_size(name),
            };
            (name, region)
        })
        .collect()
}
