use std::env;
use std::time::{Duration, Instant};

use tracing::warn;

pub const SLOW_FRAME_ENV_VAR: &str = "LANI_SLOW_FRAME_MS";

const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// What one redraw owes the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameBudget {
    /// Unclamped wall time since the previous redraw.
    pub elapsed: Duration,
    pub ticks: u32,
    /// Backlog discarded because the tick cap was reached.
    pub dropped: Duration,
}

/// Fixed-timestep clock for the window loop. Wall time is clamped per frame,
/// banked, and paid out in whole ticks up to a per-frame cap.
#[derive(Debug)]
pub(crate) struct FramePacer {
    tick: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    present_interval: Option<Duration>,
    banked: Duration,
    last_frame: Instant,
    last_present: Instant,
}

impl FramePacer {
    pub(crate) fn new(
        target_tps: u32,
        max_frame_delta: Duration,
        max_ticks_per_frame: u32,
        max_render_fps: Option<u32>,
        now: Instant,
    ) -> Self {
        let max_frame_delta = if max_frame_delta.is_zero() {
            DEFAULT_MAX_FRAME_DELTA
        } else {
            max_frame_delta
        };
        Self {
            tick: Duration::from_secs_f64(1.0 / f64::from(target_tps.max(1))),
            max_frame_delta,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            present_interval: max_render_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
            banked: Duration::ZERO,
            last_frame: now,
            last_present: now,
        }
    }

    pub(crate) fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub(crate) fn max_ticks_per_frame(&self) -> u32 {
        self.max_ticks_per_frame
    }

    pub(crate) fn max_frame_delta(&self) -> Duration {
        self.max_frame_delta
    }

    pub(crate) fn render_cap_label(&self) -> String {
        match self.present_interval {
            Some(interval) => format!("{:.0}", 1.0 / interval.as_secs_f64()),
            None => "off".to_string(),
        }
    }

    pub(crate) fn begin_frame(&mut self, now: Instant) -> FrameBudget {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.banked = self
            .banked
            .saturating_add(elapsed.min(self.max_frame_delta));

        let mut ticks = 0;
        while self.banked >= self.tick && ticks < self.max_ticks_per_frame {
            self.banked -= self.tick;
            ticks += 1;
        }
        let dropped = if self.banked >= self.tick {
            std::mem::take(&mut self.banked)
        } else {
            Duration::ZERO
        };

        FrameBudget {
            elapsed,
            ticks,
            dropped,
        }
    }

    /// Time left before the render cap allows the next present.
    pub(crate) fn present_delay(&self, now: Instant) -> Duration {
        self.present_interval
            .map(|interval| {
                interval.saturating_sub(now.saturating_duration_since(self.last_present))
            })
            .unwrap_or(Duration::ZERO)
    }

    pub(crate) fn mark_presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}

/// Artificial per-frame stall for exercising the clamp and tick cap.
/// `LANI_SLOW_FRAME_MS` overrides the configured value.
pub(crate) fn slow_frame_delay(config_ms: u64) -> Duration {
    slow_frame_delay_from(env::var(SLOW_FRAME_ENV_VAR), config_ms)
}

fn slow_frame_delay_from(value: Result<String, env::VarError>, config_ms: u64) -> Duration {
    let fallback = Duration::from_millis(config_ms);
    match value {
        Ok(raw) => raw.trim().parse::<u64>().map(Duration::from_millis).unwrap_or_else(|_| {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                value = raw.as_str(),
                "slow_frame_env_invalid"
            );
            fallback
        }),
        Err(env::VarError::NotPresent) => fallback,
        Err(err) => {
            warn!(env_var = SLOW_FRAME_ENV_VAR, error = %err, "slow_frame_env_unreadable");
            fallback
        }
    }
}
