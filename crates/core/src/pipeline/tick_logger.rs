use std::collections::HashMap;
use std::time::Instant;

/// Observer for per-tick compositor events.
///
/// The compositor reports through this trait only; the binary installs a
/// summarizing logger and tests install the null one.
pub trait TickLogger: Send {
    /// How long a named stage (`detect`, `extract`, `draw`) took in one
    /// render tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time reading such as `live_surfaces` or `regions`.
    fn metric(&mut self, name: &str, value: f64);

    /// Count one completed render tick.
    fn tick(&mut self);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullTickLogger;

impl TickLogger for NullTickLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn tick(&mut self) {}
}

/// Running aggregate of one timing stage or metric.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    pub sum: f64,
    pub max: f64,
}

impl SampleStats {
    fn record(&mut self, value: f64) {
        self.max = if self.count == 0 {
            value
        } else {
            self.max.max(value)
        };
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Keeps constant-size aggregates per stage and metric for an overlay that
/// runs until stopped, and logs them via `log::info!` at shutdown.
pub struct SummaryTickLogger {
    stages: HashMap<String, SampleStats>,
    metrics: HashMap<String, SampleStats>,
    started: Instant,
    ticks: usize,
}

impl SummaryTickLogger {
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
            metrics: HashMap::new(),
            started: Instant::now(),
            ticks: 0,
        }
    }

    /// Formatted report, or `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let secs = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Overlay summary ({} render ticks in {secs:.1}s):",
            self.ticks
        )];

        for (stage, stats) in sorted(&self.stages) {
            lines.push(format!(
                "  {stage:8} {:6.1}ms avg  {:6.1}ms max  {:7.0}ms total",
                stats.mean(),
                stats.max,
                stats.sum
            ));
        }
        for (name, stats) in sorted(&self.metrics) {
            lines.push(format!("  {name}: avg {:.1}  max {:.0}", stats.mean(), stats.max));
        }
        if self.ticks > 0 && secs > 0.0 {
            lines.push(format!("  Tick rate: {:.1}/s", self.ticks as f64 / secs));
        }

        Some(lines.join("\n"))
    }

    pub fn stage_stats(&self, stage: &str) -> Option<SampleStats> {
        self.stages.get(stage).copied()
    }

    pub fn metric_stats(&self, name: &str) -> Option<SampleStats> {
        self.metrics.get(name).copied()
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

fn sorted(map: &HashMap<String, SampleStats>) -> Vec<(&str, SampleStats)> {
    let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

impl Default for SummaryTickLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TickLogger for SummaryTickLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.stages
            .entry(stage.to_string())
            .or_default()
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().record(value);
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullTickLogger;
        logger.timing("detect", 5.0);
        logger.metric("live_surfaces", 3.0);
        logger.tick();
        logger.summary();
    }

    #[test]
    fn test_stage_stats_aggregate() {
        let mut logger = SummaryTickLogger::new();
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("draw", 5.0);

        let detect = logger.stage_stats("detect").unwrap();
        assert_eq!(detect.count, 2);
        assert_relative_eq!(detect.sum, 50.0);
        assert_relative_eq!(detect.max, 30.0);
        assert_relative_eq!(detect.mean(), 25.0);
        assert_eq!(logger.stage_stats("draw").unwrap().count, 1);
        assert!(logger.stage_stats("extract").is_none());
    }

    #[test]
    fn test_max_tracks_negative_first_sample() {
        let mut stats = SampleStats::default();
        stats.record(-4.0);
        stats.record(-9.0);
        assert_relative_eq!(stats.max, -4.0);
    }

    #[test]
    fn test_stored_state_does_not_grow_with_ticks() {
        let mut logger = SummaryTickLogger::new();
        for i in 0..100_000 {
            logger.timing("detect", 1.0);
            logger.timing("extract", 0.5);
            logger.timing("draw", 2.0);
            logger.metric("regions", 9.0);
            logger.metric("live_surfaces", (i % 10) as f64);
            logger.tick();
        }

        assert_eq!(logger.stages.len(), 3);
        assert_eq!(logger.metrics.len(), 2);
        let live = logger.metric_stats("live_surfaces").unwrap();
        assert_eq!(live.count, 100_000);
        assert_relative_eq!(live.max, 9.0);
        assert_relative_eq!(live.mean(), 4.5);
        assert_eq!(logger.ticks(), 100_000);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = SummaryTickLogger::new();
        logger.tick();
        logger.tick();
        logger.timing("detect", 12.0);
        logger.timing("draw", 4.0);
        logger.metric("regions", 9.0);
        logger.metric("regions", 0.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Overlay summary (2 render ticks"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("draw"));
        assert!(summary.contains("regions: avg 4.5  max 9"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let mut logger = SummaryTickLogger::default();
        logger.tick();
        assert!(logger.summary_string().is_none());
        assert_eq!(logger.ticks(), 1);
    }
}
