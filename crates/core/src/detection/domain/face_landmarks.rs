//! 68-point face landmarks with named point-group accessors.
//!
//! Index layout: jaw outline 0-16, left eyebrow 17-21, right eyebrow 22-26,
//! nose 27-35, left eye 36-41, right eye 42-47, mouth 48-67.

use std::ops::Range;

use thiserror::Error;

use crate::shared::constants::LANDMARK_COUNT;
use crate::shared::geometry::Point;

const JAW_OUTLINE: Range<usize> = 0..17;
const LEFT_EYEBROW: Range<usize> = 17..22;
const RIGHT_EYEBROW: Range<usize> = 22..27;
const NOSE: Range<usize> = 27..36;
const LEFT_EYE: Range<usize> = 36..42;
const RIGHT_EYE: Range<usize> = 42..48;
const MOUTH: Range<usize> = 48..68;

#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("expected {expected} landmark points, got {0}", expected = LANDMARK_COUNT)]
    WrongPointCount(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongPointCount(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Chin contour from the left ear down to the right ear.
    pub fn jaw_outline(&self) -> &[Point] {
        &self.points[JAW_OUTLINE]
    }

    pub fn left_eyebrow(&self) -> &[Point] {
        &self.points[LEFT_EYEBROW]
    }

    pub fn right_eyebrow(&self) -> &[Point] {
        &self.points[RIGHT_EYEBROW]
    }

    pub fn nose(&self) -> &[Point] {
        &self.points[NOSE]
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.points[LEFT_EYE]
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.points[RIGHT_EYE]
    }

    pub fn mouth(&self) -> &[Point] {
        &self.points[MOUTH]
    }
}
