//! Pre-computed landmark tracks stored as JSON.
//!
//! ```json
//! { "frames": [ { "index": 0, "points": [[312.0, 240.5], ...] },
//!               { "index": 1, "points": null } ] }
//! ```
//!
//! Frames that are missing or carry `null` points are "no face" frames.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::face_landmarks::{FaceLandmarks, LandmarkError};
use crate::shared::geometry::Point;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("failed to read landmark track {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid landmark track: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("frame {index}: {source}")]
    Landmarks {
        index: usize,
        source: LandmarkError,
    },
}

#[derive(Deserialize)]
struct TrackFile {
    frames: Vec<TrackEntry>,
}

#[derive(Deserialize)]
struct TrackEntry {
    index: usize,
    #[serde(default)]
    points: Option<Vec<[f64; 2]>>,
}

/// Landmarks keyed by frame index.
#[derive(Clone, Debug, Default)]
pub struct LandmarkTrack {
    frames: HashMap<usize, FaceLandmarks>,
}

impl LandmarkTrack {
    pub fn load(path: &Path) -> Result<Self, TrackError> {
        let json = std::fs::read_to_string(path).map_err(|source| TrackError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let file: TrackFile = serde_json::from_str(json)?;
        let mut frames = HashMap::with_capacity(file.frames.len());
        for entry in file.frames {
            let Some(raw) = entry.points else {
                continue;
            };
            let points = raw.into_iter().map(|[x, y]| Point::new(x, y)).collect();
            let landmarks = FaceLandmarks::new(points).map_err(|source| TrackError::Landmarks {
                index: entry.index,
                source,
            })?;
            frames.insert(entry.index, landmarks);
        }
        Ok(Self { frames })
    }

    pub fn get(&self, index: usize) -> Option<&FaceLandmarks> {
        self.frames.get(&index)
    }

    /// Number of frames that contain a face.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
