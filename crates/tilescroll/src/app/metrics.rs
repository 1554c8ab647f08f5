use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LockResult, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static POISON_REPORTED: AtomicBool = AtomicBool::new(false);

/// Takes the guard out of a possibly poisoned lock. The snapshot is plain
/// data, so a panicked writer cannot leave it half-updated.
fn recover<G>(result: LockResult<G>, operation: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        if !POISON_REPORTED.swap(true, Ordering::Relaxed) {
            warn!(operation, "metrics_lock_poisoned");
        }
        poisoned.into_inner()
    })
}

/// Averages over the last metrics interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Time spent sampling pools and rasterizing, per frame.
    pub render_time_ms: f32,
    pub sprites_per_frame: f32,
}

/// Shared read access to the latest snapshot, e.g. for a title bar.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *recover(self.latest.read(), "read")
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        *recover(self.latest.write(), "write") = snapshot;
    }
}

/// One presented frame as seen by the metrics accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameSample {
    pub frame_dt: Duration,
    pub render_dt: Duration,
    pub sprites_drawn: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct IntervalTotals {
    frames: u32,
    ticks: u32,
    frame_time: Duration,
    render_time: Duration,
    sprites: u64,
}

impl IntervalTotals {
    fn per_frame(&self, total: f32) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            total / self.frames as f32
        }
    }
}

/// Sums frames and ticks until `interval` has passed, then averages them
/// into a snapshot and starts over.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    started: Instant,
    totals: IntervalTotals,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    fn starting_at(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            started,
            totals: IntervalTotals::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, sample: FrameSample) {
        let totals = &mut self.totals;
        totals.frames = totals.frames.saturating_add(1);
        totals.frame_time = totals.frame_time.saturating_add(sample.frame_dt);
        totals.render_time = totals.render_time.saturating_add(sample.render_dt);
        totals.sprites = totals.sprites.saturating_add(sample.sprites_drawn as u64);
    }

    pub(crate) fn record_tick(&mut self) {
        self.totals.ticks = self.totals.ticks.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.interval {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let totals = std::mem::take(&mut self.totals);
        self.started = now;
        Some(LoopMetricsSnapshot {
            fps: totals.frames as f32 / seconds,
            tps: totals.ticks as f32 / seconds,
            frame_time_ms: totals.per_frame(totals.frame_time.as_secs_f32() * 1000.0),
            render_time_ms: totals.per_frame(totals.render_time.as_secs_f32() * 1000.0),
            sprites_per_frame: totals.per_frame(totals.sprites as f32),
        })
    }
}
