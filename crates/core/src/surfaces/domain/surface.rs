use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::geometry::{Rect, Size};
use crate::shared::region_name::RegionName;
use crate::surfaces::domain::visual_filter::VisualFilter;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("surface for {0} was closed")]
    Closed(RegionName),
    #[error("source frame has no pixels")]
    EmptyFrame,
    #[error("failed to write snapshot for {region}: {message}")]
    Snapshot { region: RegionName, message: String },
}

/// Identity of an opened surface, unique per factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// An independently addressable drawable output for one region.
///
/// Surfaces may be closed by outside action (e.g. the user closing a
/// window); every drawing call on a closed surface fails with
/// [`DrawError::Closed`].
pub trait Surface: Send {
    fn id(&self) -> SurfaceId;

    fn region(&self) -> RegionName;

    /// Moves the surface to a screen-space target.
    fn place(&mut self, target: &Rect) -> Result<(), DrawError>;

    /// Sets the size of the drawable area.
    fn resize(&mut self, size: Size) -> Result<(), DrawError>;

    /// Sets the post-processing used by subsequent draws.
    fn set_filter(&mut self, filter: &VisualFilter) -> Result<(), DrawError>;

    /// Crops `source` out of `frame` and scales it to fill the drawable area.
    fn draw_crop(&mut self, frame: &Frame, source: &Rect) -> Result<(), DrawError>;

    fn is_closed(&self) -> bool;

    /// Idempotent.
    fn close(&mut self);
}

/// Opens new surfaces.
///
/// `None` means the host refused the allocation; callers treat that the
/// same as running out of capacity.
pub trait SurfaceFactory: Send {
    fn open(&mut self, region: RegionName, placement: &Rect) -> Option<Box<dyn Surface>>;
}
