//! In-memory surfaces backed by a [`Canvas`], optionally mirrored to PNG
//! snapshot files so the overlay can be watched from outside the process.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::shared::frame::Frame;
use crate::shared::geometry::{Rect, Size};
use crate::shared::region_name::RegionName;
use crate::surfaces::domain::surface::{DrawError, Surface, SurfaceFactory, SurfaceId};
use crate::surfaces::domain::visual_filter::VisualFilter;
use crate::surfaces::infrastructure::canvas::{Canvas, CropFailure};
use crate::video::domain::image_writer::ImageWriter;

struct SurfaceState {
    canvas: Canvas,
    filter: VisualFilter,
    placement: Rect,
    closed: bool,
    draws: usize,
}

/// Outside view of an open surface, playing the role of the host window:
/// it can inspect what was drawn and close the surface at any time.
#[derive(Clone)]
pub struct ImageSurfaceHandle {
    id: SurfaceId,
    region: RegionName,
    state: Arc<Mutex<SurfaceState>>,
}

impl ImageSurfaceHandle {
    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn region(&self) -> RegionName {
        self.region
    }

    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn pixels(&self) -> Frame {
        self.lock().canvas.pixels().clone()
    }

    pub fn placement(&self) -> Rect {
        self.lock().placement
    }

    pub fn size(&self) -> Size {
        self.lock().canvas.size()
    }

    pub fn filter(&self) -> VisualFilter {
        self.lock().filter
    }

    /// Number of successful crop draws.
    pub fn draw_count(&self) -> usize {
        self.lock().draws
    }
}

#[derive(Clone)]
struct SnapshotTarget {
    dir: PathBuf,
    writer: Arc<dyn ImageWriter>,
    /// Integer upscale applied to the canvas when written.
    scale: u32,
}

pub struct ImageSurface {
    handle: ImageSurfaceHandle,
    snapshots: Option<SnapshotTarget>,
}

impl ImageSurface {
    fn open_state(&self) -> Result<MutexGuard<'_, SurfaceState>, DrawError> {
        let state = self.handle.lock();
        if state.closed {
            return Err(DrawError::Closed(self.handle.region));
        }
        Ok(state)
    }

    fn write_snapshot(&self, pixels: &Frame) -> Result<(), DrawError> {
        let Some(target) = &self.snapshots else {
            return Ok(());
        };
        let path = target.dir.join(format!("{}.png", self.handle.region));
        let size = (pixels.width() * target.scale, pixels.height() * target.scale);
        target
            .writer
            .write(&path, pixels, Some(size))
            .map_err(|e| DrawError::Snapshot {
                region: self.handle.region,
                message: e.to_string(),
            })
    }
}

impl Surface for ImageSurface {
    fn id(&self) -> SurfaceId {
        self.handle.id
    }

    fn region(&self) -> RegionName {
        self.handle.region
    }

    fn place(&mut self, target: &Rect) -> Result<(), DrawError> {
        self.open_state()?.placement = *target;
        Ok(())
    }

    fn resize(&mut self, size: Size) -> Result<(), DrawError> {
        self.open_state()?.canvas.resize(size);
        Ok(())
    }

    fn set_filter(&mut self, filter: &VisualFilter) -> Result<(), DrawError> {
        self.open_state()?.filter = *filter;
        Ok(())
    }

    fn draw_crop(&mut self, frame: &Frame, source: &Rect) -> Result<(), DrawError> {
        let pixels = {
            let mut state = self.open_state()?;
            let filter = state.filter;
            state
                .canvas
                .draw_crop(frame, source, &filter)
                .map_err(|failure| match failure {
                    CropFailure::EmptyFrame | CropFailure::UnsupportedChannels(_) => {
                        DrawError::EmptyFrame
                    }
                })?;
            state.draws += 1;
            self.snapshots
                .is_some()
                .then(|| state.canvas.pixels().clone())
        };
        match pixels {
            Some(pixels) => self.write_snapshot(&pixels),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    fn close(&mut self) {
        self.handle.close();
    }
}

/// Opens [`ImageSurface`]s and remembers their handles.
pub struct ImageSurfaceFactory {
    next_id: u64,
    snapshots: Option<SnapshotTarget>,
    tracked: Arc<Mutex<TrackedSurfaces>>,
}

impl ImageSurfaceFactory {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            snapshots: None,
            tracked: Arc::new(Mutex::new(TrackedSurfaces::default())),
        }
    }

    /// Mirror every draw to `<dir>/<region>.png`, upscaled by `scale`
    /// (clamped to at least 1).
    pub fn with_snapshots(mut self, dir: PathBuf, writer: Arc<dyn ImageWriter>, scale: u32) -> Self {
        self.snapshots = Some(SnapshotTarget {
            dir,
            writer,
            scale: scale.max(1),
        });
        self
    }

    /// A view of the surfaces this factory opens, usable after the
    /// factory has been handed to a pool.
    pub fn tracker(&self) -> SurfaceTracker {
        SurfaceTracker {
            tracked: self.tracked.clone(),
        }
    }
}

impl Default for ImageSurfaceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceFactory for ImageSurfaceFactory {
    fn open(&mut self, region: RegionName, placement: &Rect) -> Option<Box<dyn Surface>> {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;

        let handle = ImageSurfaceHandle {
            id,
            region,
            state: Arc::new(Mutex::new(SurfaceState {
                canvas: Canvas::new(Size::new(
                    placement.width.max(0.0).round() as u32,
                    placement.height.max(0.0).round() as u32,
                )),
                filter: VisualFilter::IDENTITY,
                placement: *placement,
                closed: false,
                draws: 0,
            })),
        };
        self.tracked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(handle.clone());

        Some(Box::new(ImageSurface {
            handle,
            snapshots: self.snapshots.clone(),
        }))
    }
}

/// Handles still reachable through a [`SurfaceTracker`]: every open
/// surface plus the newest closed one per region.
#[derive(Default)]
struct TrackedSurfaces {
    opened: usize,
    handles: Vec<ImageSurfaceHandle>,
}

impl TrackedSurfaces {
    fn record(&mut self, handle: ImageSurfaceHandle) {
        self.opened += 1;
        self.handles.push(handle);

        let mut seen = BTreeSet::new();
        let mut kept: Vec<_> = self
            .handles
            .drain(..)
            .rev()
            .filter(|h| seen.insert(h.region) || !h.is_closed())
            .collect();
        kept.reverse();
        self.handles = kept;
    }
}

#[derive(Clone)]
pub struct SurfaceTracker {
    tracked: Arc<Mutex<TrackedSurfaces>>,
}

impl SurfaceTracker {
    fn lock(&self) -> MutexGuard<'_, TrackedSurfaces> {
        self.tracked.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Most recently opened surface for `region`, open or not.
    pub fn latest(&self, region: RegionName) -> Option<ImageSurfaceHandle> {
        self.lock()
            .handles
            .iter()
            .rev()
            .find(|h| h.region == region)
            .cloned()
    }

    /// Total surfaces ever opened.
    pub fn opened_count(&self) -> usize {
        self.lock().opened
    }

    pub fn open_count(&self) -> usize {
        self.lock().handles.iter().filter(|h| !h.is_closed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        Frame::new(rgb.repeat((width * height) as usize), width, height, 3, 0)
    }

    fn placement() -> Rect {
        Rect::new(195.0, 185.0, 150.0, 90.0)
    }

    #[test]
    fn test_open_uses_placement_geometry() {
        let mut factory = ImageSurfaceFactory::new();
        let tracker = factory.tracker();
        let surface = factory.open(RegionName::LeftEye, &placement()).unwrap();

        let handle = tracker.latest(RegionName::LeftEye).unwrap();
        assert_eq!(handle.id(), surface.id());
        assert_eq!(handle.placement(), placement());
        assert_eq!(handle.size(), Size::new(150, 90));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut factory = ImageSurfaceFactory::new();
        let a = factory.open(RegionName::Nose, &placement()).unwrap();
        let b = factory.open(RegionName::Nose, &placement()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_draw_updates_canvas() {
        let mut factory = ImageSurfaceFactory::new();
        let tracker = factory.tracker();
        let mut surface = factory.open(RegionName::Mouth, &placement()).unwrap();

        surface.resize(Size::new(200, 70)).unwrap();
        surface.set_filter(&VisualFilter::default()).unwrap();
        surface
            .draw_crop(&solid(64, 64, [255, 0, 0]), &Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();

        let handle = tracker.latest(RegionName::Mouth).unwrap();
        let px = handle.pixels();
        assert_eq!((px.width(), px.height()), (200, 70));
        assert_eq!(px.data()[0], px.data()[1]);
        assert_eq!(handle.draw_count(), 1);
        assert_eq!(handle.filter(), VisualFilter::default());
    }

    #[test]
    fn test_external_close_fails_draws() {
        let mut factory = ImageSurfaceFactory::new();
        let tracker = factory.tracker();
        let mut surface = factory.open(RegionName::Chin, &placement()).unwrap();

        tracker.latest(RegionName::Chin).unwrap().close();

        assert!(surface.is_closed());
        let err = surface
            .draw_crop(&solid(8, 8, [0, 0, 0]), &Rect::new(0.0, 0.0, 4.0, 4.0))
            .unwrap_err();
        assert!(matches!(err, DrawError::Closed(RegionName::Chin)));
        assert!(surface.resize(Size::new(1, 1)).is_err());
        assert_eq!(tracker.open_count(), 0);
        assert_eq!(tracker.opened_count(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut factory = ImageSurfaceFactory::new();
        let mut surface = factory.open(RegionName::Nose, &placement()).unwrap();
        surface.close();
        surface.close();
        assert!(surface.is_closed());
    }

    #[test]
    fn test_place_moves_surface() {
        let mut factory = ImageSurfaceFactory::new();
        let tracker = factory.tracker();
        let mut surface = factory.open(RegionName::RightEar, &placement()).unwrap();

        let moved = Rect::new(10.0, 20.0, 120.0, 180.0);
        surface.place(&moved).unwrap();

        assert_eq!(tracker.latest(RegionName::RightEar).unwrap().placement(), moved);
    }

    #[test]
    fn test_empty_frame_is_draw_error() {
        let mut factory = ImageSurfaceFactory::new();
        let mut surface = factory.open(RegionName::Nose, &placement()).unwrap();
        let err = surface
            .draw_crop(&Frame::blank(0, 0), &Rect::new(0.0, 0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, DrawError::EmptyFrame));
    }

    #[test]
    fn test_snapshots_written_per_region() {
        let dir = tempfile::tempdir().unwrap();
        let mut factory = ImageSurfaceFactory::new()
            .with_snapshots(dir.path().to_path_buf(), Arc::new(ImageFileWriter::new()), 1);
        let mut surface = factory.open(RegionName::LeftEyebrow, &placement()).unwrap();

        surface.resize(Size::new(120, 50)).unwrap();
        surface
            .draw_crop(&solid(32, 32, [40, 40, 40]), &Rect::new(0.0, 0.0, 16.0, 16.0))
            .unwrap();

        let img = image::open(dir.path().join("leftEyebrow.png")).unwrap();
        assert_eq!((img.width(), img.height()), (120, 50));
    }

    #[test]
    fn test_snapshot_failure_is_reported() {
        let mut factory = ImageSurfaceFactory::new().with_snapshots(
            PathBuf::from("/proc/facemosaic-no-such-dir"),
            Arc::new(ImageFileWriter::new()),
            1,
        );
        let mut surface = factory.open(RegionName::Nose, &placement()).unwrap();
        let err = surface
            .draw_crop(&solid(8, 8, [1, 1, 1]), &Rect::new(0.0, 0.0, 4.0, 4.0))
            .unwrap_err();
        assert!(matches!(err, DrawError::Snapshot { region: RegionName::Nose, .. }));
    }

    #[test]
    fn test_snapshot_scale_upsizes_written_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut factory = ImageSurfaceFactory::new().with_snapshots(
            dir.path().to_path_buf(),
            Arc::new(ImageFileWriter::new()),
            2,
        );
        let mut surface = factory.open(RegionName::Mouth, &placement()).unwrap();

        surface.resize(Size::new(200, 70)).unwrap();
        surface
            .draw_crop(&solid(32, 32, [90, 90, 90]), &Rect::new(0.0, 0.0, 16.0, 16.0))
            .unwrap();

        let img = image::open(dir.path().join("mouth.png")).unwrap();
        assert_eq!((img.width(), img.height()), (400, 140));
    }

    #[test]
    fn test_closed_surfaces_are_not_retained() {
        let mut factory = ImageSurfaceFactory::new();
        let tracker = factory.tracker();
        let mut last = None;

        for _ in 0..1_000 {
            let mut surface = factory.open(RegionName::Mouth, &placement()).unwrap();
            surface.resize(Size::new(200, 70)).unwrap();
            last = Some(surface.id());
            surface.close();
        }

        assert_eq!(tracker.opened_count(), 1_000);
        assert_eq!(tracker.open_count(), 0);
        assert_eq!(tracker.tracked.lock().unwrap().handles.len(), 1);
        assert_eq!(tracker.latest(RegionName::Mouth).map(|h| h.id()), last);
    }

    #[test]
    fn test_retained_handles_bounded_by_open_plus_one_per_region() {
        let mut factory = ImageSurfaceFactory::new();
        let tracker = factory.tracker();
        let mut nose = factory.open(RegionName::Nose, &placement()).unwrap();

        for _ in 0..200 {
            let mut surfaces: Vec<_> = RegionName::ALL
                .iter()
                .map(|&r| factory.open(r, &placement()).unwrap())
                .collect();
            surfaces.iter_mut().for_each(|s| s.close());
        }

        assert_eq!(tracker.opened_count(), 1 + 200 * 9);
        // The long-lived nose surface stays tracked beside one closed
        // handle per region.
        assert_eq!(tracker.tracked.lock().unwrap().handles.len(), 10);
        assert_eq!(tracker.open_count(), 1);
        nose.close();
        assert_eq!(tracker.open_count(), 0);
    }
}
