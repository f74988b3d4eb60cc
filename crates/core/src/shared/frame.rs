use ndarray::{s, ArrayView3, ArrayViewMut3};

use crate::shared::geometry::Rect;

/// A single video frame or surface canvas: contiguous RGB bytes in
/// row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// An all-black RGB frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(vec![0; (width as usize) * (height as usize) * 3], width, height, 3, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `rect`, clipped to the frame.
    ///
    /// A box that is thinner than a pixel or lies entirely outside the
    /// frame still yields at least one pixel (the nearest edge pixel).
    /// Returns `None` only when the frame itself has no pixels.
    pub fn crop(&self, rect: &Rect) -> Option<Frame> {
        if self.is_empty() || !rect.is_finite() {
            return None;
        }
        let (x0, x1) = pixel_span(rect.x, rect.right(), self.width);
        let (y0, y1) = pixel_span(rect.y, rect.bottom(), self.height);

        let view = self.as_ndarray();
        let window = view.slice(s![y0..y1, x0..x1, ..]);
        let data: Vec<u8> = window.iter().copied().collect();
        Some(Frame::new(
            data,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
            self.channels,
            self.index,
        ))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// Clips `[start, end)` to `[0, limit)` in whole pixels, never returning an
/// empty span. `limit` must be positive.
fn pixel_span(start: f64, end: f64, limit: u32) -> (usize, usize) {
    let limit = limit as f64;
    let lo = start.max(0.0).floor().min(limit - 1.0);
    let hi = end.min(limit).ceil().max(lo + 1.0);
    (lo as usize, hi as usize)
}
