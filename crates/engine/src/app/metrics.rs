use std::time::{Duration, Instant};

/// Rates averaged over one reporting interval, logged by the frame loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub active_actors: usize,
    pub clamped_frames: u32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    clamped_frames: u32,
    frame_time_sum: Duration,
    active_actors: usize,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub(crate) fn starting_at(interval_start: Instant, interval: Duration) -> Self {
        Self {
            interval_start,
            interval,
            frames: 0,
            ticks: 0,
            clamped_frames: 0,
            frame_time_sum: Duration::ZERO,
            active_actors: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, was_clamped: bool) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        if was_clamped {
            self.clamped_frames = self.clamped_frames.saturating_add(1);
        }
    }

    pub(crate) fn record_tick(&mut self, active_actors: usize) {
        self.ticks = self.ticks.saturating_add(1);
        self.active_actors = active_actors;
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_sum.as_secs_f32() / frames as f32 * 1000.0,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            active_actors: self.active_actors,
            clamped_frames: self.clamped_frames,
        };

        *self = Self::starting_at(now, self.interval);
        Some(snapshot)
    }
}
