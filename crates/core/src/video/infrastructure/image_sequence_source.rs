use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::geometry::Rect;
use crate::video::domain::video_source::VideoSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no image frames found in {0}")]
    NoFrames(PathBuf),
    #[error("failed to list {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{path} is {actual:?}, expected {expected:?}")]
    SizeMismatch {
        path: PathBuf,
        actual: (u32, u32),
        expected: (u32, u32),
    },
}

/// Presents a still image, or a directory of numbered frames, as a live
/// video feed.
///
/// Frames are decoded lazily, one per call, in file-name order; the frame
/// index is the position in that order. All frames must share the size of
/// the first one.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    position: usize,
    looping: bool,
    width: u32,
    height: u32,
    screen_rect: Rect,
    /// Decoded pixels of a single-image source, reused every tick.
    still: Option<Frame>,
}

impl ImageSequenceSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let paths = if path.is_dir() {
            list_frames(path)?
        } else {
            vec![path.to_path_buf()]
        };
        let first = paths
            .first()
            .ok_or_else(|| SourceError::NoFrames(path.to_path_buf()))?;
        let frame = decode(first, 0)?;
        let (width, height) = (frame.width(), frame.height());
        let still = (paths.len() == 1).then_some(frame);

        Ok(Self {
            paths,
            position: 0,
            looping: false,
            width,
            height,
            screen_rect: Rect::new(0.0, 0.0, width as f64, height as f64),
            still,
        })
    }

    /// Restart from the first frame instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_screen_rect(mut self, rect: Rect) -> Self {
        self.screen_rect = rect;
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.position >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            self.position = 0;
        }
        let index = self.position;
        self.position += 1;

        if let Some(still) = &self.still {
            return Ok(Some(still.clone()));
        }

        let path = &self.paths[index];
        let frame = decode(path, index)?;
        if (frame.width(), frame.height()) != (self.width, self.height) {
            return Err(SourceError::SizeMismatch {
                path: path.clone(),
                actual: (frame.width(), frame.height()),
                expected: (self.width, self.height),
            });
        }
        Ok(Some(frame))
    }
}

impl VideoSource for ImageSequenceSource {
    fn current_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        Ok(self.next_frame()?)
    }

    fn screen_rect(&self) -> Rect {
        self.screen_rect
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let list_err = |source| SourceError::List {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn decode(path: &Path, index: usize) -> Result<Frame, SourceError> {
    let img = image::open(path)
        .map_err(|source| SourceError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (w, h) = img.dimensions();
    Ok(Frame::new(img.into_raw(), w, h, 3, index))
}
