use std::time::Instant;

use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::mosaic::domain::crop_bounds::padded_bounds;
use crate::mosaic::domain::mosaic_layout::MosaicLayout;
use crate::mosaic::domain::region_extractor::{extract_regions, FacialRegion};
use crate::pipeline::tick_logger::{NullTickLogger, TickLogger};
use crate::shared::constants::CROP_PADDING;
use crate::shared::frame::Frame;
use crate::shared::geometry::Rect;
use crate::shared::region_name::RegionName;
use crate::surfaces::domain::surface::{DrawError, Surface};
use crate::surfaces::domain::surface_pool::SurfacePool;
use crate::surfaces::domain::visual_filter::VisualFilter;
use crate::video::domain::video_source::VideoSource;

/// What a single render tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The video source has no more frames.
    SourceEnded,
    /// No face this tick; every surface was left untouched.
    NoFace,
    Rendered {
        drawn: usize,
        /// Regions without a surface (pool full or allocation refused).
        skipped: usize,
        failed: usize,
    },
}

/// Per-tick orchestration: detect → extract → layout → ensure/draw.
///
/// Regions that drop out of detection keep their last image until the pool's
/// TTL sweep evicts them.
pub struct Compositor {
    source: Box<dyn VideoSource>,
    detector: Box<dyn LandmarkDetector>,
    pool: SurfacePool,
    filter: VisualFilter,
    logger: Box<dyn TickLogger>,
    last_source_rect: Option<Rect>,
}

impl Compositor {
    pub fn new(
        source: Box<dyn VideoSource>,
        detector: Box<dyn LandmarkDetector>,
        pool: SurfacePool,
    ) -> Self {
        Self {
            source,
            detector,
            pool,
            filter: VisualFilter::default(),
            logger: Box::new(NullTickLogger),
            last_source_rect: None,
        }
    }

    pub fn with_filter(mut self, filter: VisualFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn TickLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn pool(&self) -> &SurfacePool {
        &self.pool
    }

    /// Runs one render tick at `now`.
    ///
    /// Only a failing video source is an error. Detector failures count as
    /// "no face" and per-region draw failures are logged and skipped.
    pub fn render_tick(&mut self, now: Instant) -> Result<TickOutcome, Box<dyn std::error::Error>> {
        let Some(frame) = self.source.current_frame()? else {
            return Ok(TickOutcome::SourceEnded);
        };

        let t0 = Instant::now();
        let landmarks = match self.detector.detect(&frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                log::warn!("Landmark detection failed on frame {}: {e}", frame.index());
                None
            }
        };
        self.logger.timing("detect", elapsed_ms(t0));

        let t0 = Instant::now();
        let regions = extract_regions(landmarks.as_ref());
        self.logger.timing("extract", elapsed_ms(t0));
        self.logger.metric("regions", regions.len() as f64);

        if regions.is_empty() {
            log::debug!("No face in frame {}", frame.index());
            self.finish_tick();
            return Ok(TickOutcome::NoFace);
        }

        let layout = MosaicLayout::compute(&self.source_rect());

        let t0 = Instant::now();
        let (mut drawn, mut skipped, mut failed) = (0, 0, 0);
        for (name, region) in &regions {
            let target = layout.target(*name);
            let Some(surface) = self.pool.ensure(*name, &target, now) else {
                skipped += 1;
                continue;
            };
            match draw_region(surface, region, &target, &frame, &self.filter) {
                Ok(()) => drawn += 1,
                Err(e) => {
                    log::warn!("Failed to draw {name}: {e}");
                    failed += 1;
                }
            }
        }
        self.logger.timing("draw", elapsed_ms(t0));

        log::debug!(
            "Frame {}: drew {drawn}, skipped {skipped}, failed {failed}",
            frame.index()
        );
        self.finish_tick();
        Ok(TickOutcome::Rendered {
            drawn,
            skipped,
            failed,
        })
    }

    /// Runs the TTL sweep at `now` and returns the evicted regions.
    pub fn evict_tick(&mut self, now: Instant) -> Vec<RegionName> {
        let evicted = self.pool.sweep(now);
        if !evicted.is_empty() {
            self.logger.metric("live_surfaces", self.pool.len() as f64);
        }
        evicted
    }

    /// Closes every live surface and reports the run summary.
    pub fn shutdown(&mut self) {
        log::info!("Closing {} surfaces", self.pool.len());
        self.pool.close_all();
        self.logger.summary();
    }

    /// Current on-screen source rectangle, or the last one that had an
    /// area while the source is not laid out.
    fn source_rect(&mut self) -> Rect {
        let rect = self.source.screen_rect();
        if rect.is_finite() && rect.has_area() {
            self.last_source_rect = Some(rect);
            return rect;
        }
        self.last_source_rect.unwrap_or(rect)
    }

    fn finish_tick(&mut self) {
        self.logger.metric("live_surfaces", self.pool.len() as f64);
        self.logger.tick();
    }
}

fn draw_region(
    surface: &mut dyn Surface,
    region: &FacialRegion,
    target: &Rect,
    frame: &Frame,
    filter: &VisualFilter,
) -> Result<(), DrawError> {
    surface.place(target)?;
    surface.resize(region.output_size)?;
    surface.set_filter(filter)?;
    surface.draw_crop(frame, &padded_bounds(&region.points, CROP_PADDING))
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
