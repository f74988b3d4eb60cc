use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver};

use crate::pipeline::compositor::{Compositor, TickOutcome};
use crate::shared::constants::{EVICTION_PERIOD, RENDER_PERIOD};

/// Why [`TickScheduler::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The stop channel fired or was disconnected.
    Stopped,
    SourceEnded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub render_ticks: usize,
    pub eviction_ticks: usize,
    pub surfaces_evicted: usize,
    pub reason: StopReason,
}

/// Drives a [`Compositor`] with two periodic timers on the calling thread.
///
/// Render and eviction ticks are multiplexed by one `select!` loop, so a tick
/// body always runs to completion before the next one starts and at most one
/// detection is ever in flight. Ticks missed while a slow render is running
/// are dropped by the tick channels rather than queued.
pub struct TickScheduler {
    render_period: Duration,
    eviction_period: Duration,
}

impl TickScheduler {
    pub fn new(render_period: Duration, eviction_period: Duration) -> Self {
        Self {
            render_period,
            eviction_period,
        }
    }

    pub fn render_period(&self) -> Duration {
        self.render_period
    }

    pub fn eviction_period(&self) -> Duration {
        self.eviction_period
    }

    /// Runs until `stop` yields a message (or disconnects) or the source
    /// ends, then shuts the compositor down, closing every live surface.
    ///
    /// Any receiver works as a stop signal, e.g. `crossbeam_channel::after`
    /// for a deadline or `crossbeam_channel::never` to run to the end.
    pub fn run<T>(&self, compositor: &mut Compositor, stop: &Receiver<T>) -> RunSummary {
        let render = tick(self.render_period);
        let eviction = tick(self.eviction_period);
        let mut summary = RunSummary {
            render_ticks: 0,
            eviction_ticks: 0,
            surfaces_evicted: 0,
            reason: StopReason::Stopped,
        };

        log::info!(
            "Ticking every {:?} (render) and {:?} (eviction)",
            self.render_period,
            self.eviction_period
        );

        loop {
            select! {
                recv(stop) -> _ => {
                    log::info!("Stop requested");
                    break;
                }
                recv(render) -> now => {
                    let Ok(now) = now else { continue };
                    match compositor.render_tick(now) {
                        Ok(TickOutcome::SourceEnded) => {
                            log::info!("Video source ended");
                            summary.reason = StopReason::SourceEnded;
                            break;
                        }
                        Ok(_) => summary.render_ticks += 1,
                        Err(e) => {
                            log::warn!("Render tick failed: {e}");
                            summary.render_ticks += 1;
                        }
                    }
                }
                recv(eviction) -> now => {
                    let Ok(now) = now else { continue };
                    summary.eviction_ticks += 1;
                    summary.surfaces_evicted += compositor.evict_tick(now).len();
                }
            }
        }

        compositor.shutdown();
        log::info!(
            "Ran {} render ticks, {} eviction ticks, evicted {} surfaces",
            summary.render_ticks,
            summary.eviction_ticks,
            summary.surfaces_evicted
        );
        summary
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(RENDER_PERIOD, EVICTION_PERIOD)
    }
}
