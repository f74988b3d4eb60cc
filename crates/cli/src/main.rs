use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use facemosaic_core::detection::infrastructure::landmark_track::LandmarkTrack;
use facemosaic_core::detection::infrastructure::replay_landmark_detector::ReplayLandmarkDetector;
use facemosaic_core::pipeline::compositor::Compositor;
use facemosaic_core::pipeline::tick_logger::SummaryTickLogger;
use facemosaic_core::pipeline::tick_scheduler::{StopReason, TickScheduler};
use facemosaic_core::shared::geometry::{Point, Rect};
use facemosaic_core::surfaces::domain::surface_pool::SurfacePool;
use facemosaic_core::surfaces::domain::visual_filter::FilterPreset;
use facemosaic_core::surfaces::infrastructure::image_surface::ImageSurfaceFactory;
use facemosaic_core::video::infrastructure::image_file_writer::ImageFileWriter;
use facemosaic_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

/// Overlays cropped, filtered facial regions in a mosaic around a video.
#[derive(Parser)]
#[command(name = "facemosaic")]
struct Cli {
    /// Input image, or directory of frames played in name order.
    input: PathBuf,

    /// Landmark track (JSON) with 68 points per frame index.
    #[arg(long)]
    landmarks: PathBuf,

    /// On-screen rectangle of the video as x,y,width,height
    /// (default: 0,0 and the frame size).
    #[arg(long, value_delimiter = ',')]
    source_rect: Option<Vec<f64>>,

    /// Screen position of the client area containing the video, as x,y.
    #[arg(long, value_delimiter = ',', default_value = "0,0")]
    screen_origin: Vec<f64>,

    /// Write each surface's canvas to <dir>/<region>.png after every draw.
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Integer upscale applied to snapshot images.
    #[arg(long, default_value = "1")]
    snapshot_scale: u32,

    /// Region filter: contrast, strong, bright, invert, sepia, dark.
    #[arg(long, default_value = "contrast")]
    filter: String,

    /// Stop after this many seconds instead of at the end of the input.
    #[arg(long)]
    duration: Option<f64>,

    /// Restart a frame directory from the beginning when it runs out.
    /// A single image always repeats.
    #[arg(long)]
    loop_source: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let filter: FilterPreset = cli.filter.parse()?;
    let track = LandmarkTrack::load(&cli.landmarks)?;
    log::info!("Loaded landmarks for {} frames", track.len());

    let source = ImageSequenceSource::open(&cli.input)?
        .looping(cli.loop_source || !cli.input.is_dir());
    let (width, height) = source.dimensions();
    let screen_rect = parse_source_rect(cli.source_rect.as_deref(), width, height)
        .offset(parse_origin(&cli.screen_origin));
    log::info!(
        "Source {}x{} ({} frames) shown at {screen_rect:?}",
        width,
        height,
        source.len()
    );
    let source = source.with_screen_rect(screen_rect);

    let mut factory = ImageSurfaceFactory::new();
    if let Some(dir) = cli.snapshots {
        std::fs::create_dir_all(&dir)?;
        log::info!("Writing surface snapshots to {}", dir.display());
        factory = factory.with_snapshots(
            dir,
            Arc::new(ImageFileWriter::new()),
            cli.snapshot_scale,
        );
    }

    let mut compositor = Compositor::new(
        Box::new(source),
        Box::new(ReplayLandmarkDetector::new(Arc::new(track))),
        SurfacePool::new(Box::new(factory)),
    )
    .with_filter(filter.filter())
    .with_logger(Box::new(SummaryTickLogger::new()));

    let stop = match cli.duration {
        Some(secs) => crossbeam_channel::after(Duration::from_secs_f64(secs)),
        None => crossbeam_channel::never(),
    };
    let summary = TickScheduler::default().run(&mut compositor, &stop);

    let reason = match summary.reason {
        StopReason::Stopped => "time limit reached",
        StopReason::SourceEnded => "end of input",
    };
    println!(
        "Stopped ({reason}): {} render ticks, {} surfaces evicted",
        summary.render_ticks, summary.surfaces_evicted
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if !cli.landmarks.is_file() {
        return Err(format!("Landmark file not found: {}", cli.landmarks.display()).into());
    }
    if let Some(rect) = &cli.source_rect {
        if rect.len() != 4 {
            return Err(format!(
                "Source rect must be x,y,width,height, got {} values",
                rect.len()
            )
            .into());
        }
        if rect[2] < 0.0 || rect[3] < 0.0 {
            return Err("Source rect width and height must not be negative".into());
        }
    }
    if cli.snapshot_scale == 0 {
        return Err("Snapshot scale must be at least 1".into());
    }
    if cli.screen_origin.len() != 2 {
        return Err(format!(
            "Screen origin must be x,y, got {} values",
            cli.screen_origin.len()
        )
        .into());
    }
    if let Some(secs) = cli.duration {
        if !(secs.is_finite() && secs > 0.0) {
            return Err(format!("Duration must be a positive number of seconds, got {secs}").into());
        }
    }
    Ok(())
}

fn parse_source_rect(values: Option<&[f64]>, width: u32, height: u32) -> Rect {
    match values {
        Some(&[x, y, w, h]) => Rect::new(x, y, w, h),
        _ => Rect::new(0.0, 0.0, width as f64, height as f64),
    }
}

fn parse_origin(values: &[f64]) -> Point {
    match values {
        &[x, y] => Point::new(x, y),
        _ => Point::default(),
    }
}
