//! Fixed mosaic arrangement of region targets around the source video.
//!
//! Every target is placed relative to the center of the source rectangle
//! in multiples of [`MOSAIC_UNIT`]: brows and eyes above and to the sides,
//! nose on the center line, mouth and chin below, ears at the far sides.

use crate::shared::constants::MOSAIC_UNIT;
use crate::shared::geometry::{Point, Rect};
use crate::shared::region_name::RegionName;

/// Placement of one region as multiples of the mosaic unit:
/// `(dx, dy, width, height)` with `dx`/`dy` measured from the source center.
type UnitPlacement = (f64, f64, f64, f64);

fn unit_placement(name: RegionName) -> UnitPlacement {
    match name {
        RegionName::LeftEyebrow => (-1.5, -1.2, 1.0, 0.4),
        RegionName::RightEyebrow => (0.5, -1.2, 1.0, 0.4),
        RegionName::LeftEye => (-1.5, -0.7, 1.0, 0.6),
        RegionName::RightEye => (0.5, -0.7, 1.0, 0.6),
        RegionName::Nose => (-0.5, -0.5, 1.0, 1.2),
        RegionName::Mouth => (-1.0, 0.7, 2.0, 0.6),
        RegionName::LeftEar => (-2.5, 0.0, 0.8, 1.2),
        RegionName::RightEar => (1.7, 0.0, 0.8, 1.2),
        RegionName::Chin => (-0.8, 1.5, 1.6, 0.8),
    }
}

/// Screen-space target rectangle for every region name.
#[derive(Clone, Debug, PartialEq)]
pub struct MosaicLayout {
    targets: [Rect; 9],
}

impl MosaicLayout {
    /// Computes all targets for a source rectangle given in screen space.
    ///
    /// Total: non-finite source coordinates are treated as zero so the
    /// result is always finite, and a zero-sized source simply collapses
    /// the mosaic around its origin.
    pub fn compute(source: &Rect) -> Self {
        let center = finite_center(source);
        let targets = RegionName::ALL.map(|name| {
            let (dx, dy, w, h) = unit_placement(name);
            Rect::new(
                center.x + dx * MOSAIC_UNIT,
                center.y + dy * MOSAIC_UNIT,
                w * MOSAIC_UNIT,
                h * MOSAIC_UNIT,
            )
        });
        Self { targets }
    }

    pub fn target(&self, name: RegionName) -> Rect {
        self.targets[name as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionName, Rect)> + '_ {
        RegionName::ALL.into_iter().zip(self.targets.iter().copied())
    }
}

fn finite_center(source: &Rect) -> Point {
    let or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
    let sanitized = Rect::new(
        or_zero(source.x),
        or_zero(source.y),
        or_zero(source.width).max(0.0),
        or_zero(source.height).max(0.0),
    );
    sanitized.center()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn video_rect() -> Rect {
        Rect::new(100.0, 50.0, 640.0, 480.0)
    }

    #[test]
    fn test_left_eye_scenario() {
        // center = (420, 290); x = 420 - 1.5*150, y = 290 - 0.7*150
        let layout = MosaicLayout::compute(&video_rect());
        let eye = layout.target(RegionName::LeftEye);
        assert_relative_eq!(eye.x, 195.0);
        assert_relative_eq!(eye.y, 185.0, epsilon = 1e-9);
        assert_relative_eq!(eye.width, 150.0);
        assert_relative_eq!(eye.height, 90.0, epsilon = 1e-9);
    }

    #[rstest]
    #[case(RegionName::LeftEyebrow, 195.0, 110.0, 150.0, 60.0)]
    #[case(RegionName::RightEyebrow, 495.0, 110.0, 150.0, 60.0)]
    #[case(RegionName::RightEye, 495.0, 185.0, 150.0, 90.0)]
    #[case(RegionName::Nose, 345.0, 215.0, 150.0, 180.0)]
    #[case(RegionName::Mouth, 270.0, 395.0, 300.0, 90.0)]
    #[case(RegionName::LeftEar, 45.0, 290.0, 120.0, 180.0)]
    #[case(RegionName::RightEar, 675.0, 290.0, 120.0, 180.0)]
    #[case(RegionName::Chin, 300.0, 515.0, 240.0, 120.0)]
    fn test_targets_around_center(
        #[case] name: RegionName,
        #[case] x: f64,
        #[case] y: f64,
        #[case] w: f64,
        #[case] h: f64,
    ) {
        let r = MosaicLayout::compute(&video_rect()).target(name);
        assert_relative_eq!(r.x, x, epsilon = 1e-9);
        assert_relative_eq!(r.y, y, epsilon = 1e-9);
        assert_relative_eq!(r.width, w, epsilon = 1e-9);
        assert_relative_eq!(r.height, h, epsilon = 1e-9);
    }

    #[test]
    fn test_iter_yields_all_names_in_order() {
        let layout = MosaicLayout::compute(&video_rect());
        let names: Vec<_> = layout.iter().map(|(n, _)| n).collect();
        assert_eq!(names, RegionName::ALL.to_vec());
    }

    #[test]
    fn test_is_deterministic() {
        assert_eq!(
            MosaicLayout::compute(&video_rect()),
            MosaicLayout::compute(&video_rect())
        );
    }

    #[test]
    fn test_moving_source_moves_every_target() {
        let a = MosaicLayout::compute(&video_rect());
        let moved = Rect::new(130.0, 40.0, 640.0, 480.0);
        let b = MosaicLayout::compute(&moved);
        for ((_, ra), (_, rb)) in a.iter().zip(b.iter()) {
            assert_relative_eq!(rb.x - ra.x, 30.0, epsilon = 1e-9);
            assert_relative_eq!(rb.y - ra.y, -10.0, epsilon = 1e-9);
        }
    }

    #[rstest]
    #[case::zero_sized(Rect::new(0.0, 0.0, 0.0, 0.0))]
    #[case::not_laid_out(Rect::new(300.0, 200.0, 0.0, 0.0))]
    #[case::nan(Rect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN))]
    #[case::infinite(Rect::new(f64::INFINITY, 0.0, 640.0, f64::NEG_INFINITY))]
    #[case::negative_size(Rect::new(10.0, 10.0, -640.0, -480.0))]
    fn test_targets_are_finite_with_non_negative_size(#[case] source: Rect) {
        let layout = MosaicLayout::compute(&source);
        assert_eq!(layout.iter().count(), 9);
        for (_, r) in layout.iter() {
            assert!(r.is_finite());
            assert!(r.width >= 0.0 && r.height >= 0.0);
        }
    }
}
