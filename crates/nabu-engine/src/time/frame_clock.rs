use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds, after clamping.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Produces one [`FrameTime`] per rendered frame.
///
/// Delta time is clamped so a debugger pause or a stall does not show up as a
/// multi-second frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline without advancing the frame counter.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages over one reporting window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStats {
    pub fps: f32,
    pub avg_frame_ms: f32,
    pub frames: u32,
}

/// Accumulates frame times and reports an average once per `interval`.
#[derive(Debug, Clone)]
pub struct FrameStatsAccumulator {
    interval: Duration,
    elapsed: Duration,
    frames: u32,
}

impl FrameStatsAccumulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            frames: 0,
        }
    }

    /// Adds one frame; returns the window's stats when it closes.
    pub fn record(&mut self, time: &FrameTime) -> Option<FrameStats> {
        self.elapsed += Duration::from_secs_f32(time.dt);
        self.frames += 1;
        if self.elapsed < self.interval {
            return None;
        }

        let secs = self.elapsed.as_secs_f32();
        let stats = FrameStats {
            fps: self.frames as f32 / secs,
            avg_frame_ms: secs * 1000.0 / self.frames as f32,
            frames: self.frames,
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(stats)
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let start = clock.last;

        let stalled = clock.tick_at(start + Duration::from_secs(5));
        assert!((stalled.dt - 0.1).abs() < 1e-6);

        let tight = clock.tick_at(start + Duration::from_secs(5));
        assert!((tight.dt - 0.001).abs() < 1e-6);
        assert_eq!((stalled.frame_index, tight.frame_index), (0, 1));
    }

    #[test]
    fn stats_report_once_per_interval() {
        let mut stats = FrameStatsAccumulator::new(Duration::from_millis(90));
        let now = Instant::now();
        let frame = |i| FrameTime {
            dt: 0.025,
            now,
            frame_index: i,
        };

        assert!(stats.record(&frame(0)).is_none());
        assert!(stats.record(&frame(1)).is_none());
        assert!(stats.record(&frame(2)).is_none());
        let report = stats.record(&frame(3)).unwrap();

        assert_eq!(report.frames, 4);
        assert!((report.fps - 40.0).abs() < 0.5);
        assert!((report.avg_frame_ms - 25.0).abs() < 0.5);
        assert!(stats.record(&frame(4)).is_none());
    }
}
