use crate::shared::geometry::{Point, Rect};

/// Smallest side a crop box may have before padding.
const MIN_EXTENT: f64 = 1.0;

/// Axis-aligned box around `points`, grown by `padding` on every side.
///
/// The unpadded box is clamped to at least 1x1, so a single point (or a
/// set of identical points) still produces a usable crop. An empty set is
/// treated as a single point at the origin.
pub fn padded_bounds(points: &[Point], padding: f64) -> Rect {
    let (min, max) = match points.split_first() {
        None => (Point::default(), Point::default()),
        Some((first, rest)) => rest.iter().fold((*first, *first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }),
    };

    let width = (max.x - min.x).max(MIN_EXTENT);
    let height = (max.y - min.y).max(MIN_EXTENT);
    Rect::new(
        min.x - padding,
        min.y - padding,
        width + padding * 2.0,
        height + padding * 2.0,
    )
}
