use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::shared::frame::Frame;
use crate::shared::geometry::{Rect, Size};
use crate::surfaces::domain::visual_filter::VisualFilter;

/// Why a crop could not be drawn.
#[derive(Debug, PartialEq, Eq)]
pub enum CropFailure {
    EmptyFrame,
    UnsupportedChannels(u8),
}

/// RGB drawable area of a surface.
#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: Frame,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            pixels: Frame::blank(size.width, size.height),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &Frame {
        &self.pixels
    }

    /// Changes the drawable size. Like an HTML canvas, a size change
    /// clears the contents; setting the same size keeps them.
    pub fn resize(&mut self, size: Size) {
        if size != self.size() {
            self.pixels = Frame::blank(size.width, size.height);
        }
    }

    /// Crops `source` from `frame`, scales it to fill the canvas, and
    /// applies `filter`.
    pub fn draw_crop(
        &mut self,
        frame: &Frame,
        source: &Rect,
        filter: &VisualFilter,
    ) -> Result<(), CropFailure> {
        if frame.channels() != 3 {
            return Err(CropFailure::UnsupportedChannels(frame.channels()));
        }
        let crop = frame.crop(source).ok_or(CropFailure::EmptyFrame)?;
        let Size { width, height } = self.size();
        if width == 0 || height == 0 {
            return Ok(());
        }

        let img = RgbImage::from_raw(crop.width(), crop.height(), crop.data().to_vec())
            .ok_or(CropFailure::EmptyFrame)?;
        let scaled = if img.dimensions() == (width, height) {
            img
        } else {
            imageops::resize(&img, width, height, FilterType::Triangle)
        };

        let mut data = scaled.into_raw();
        filter.apply_in_place(&mut data);
        self.pixels = Frame::new(data, width, height, 3, frame.index());
        Ok(())
    }
}
