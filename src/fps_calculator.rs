use std::time::{Duration, Instant};

/// Counts presented frames and reports a rate once per reporting window.
#[derive(Debug, Clone)]
pub struct FpsCalculator {
    window_start: Instant,
    window: Duration,
    frames: u32,
    fps: f32,
}

impl FpsCalculator {
    pub const REPORT_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new() -> Self {
        Self::starting_at(Instant::now(), Self::REPORT_INTERVAL)
    }

    pub fn starting_at(window_start: Instant, window: Duration) -> Self {
        Self {
            window_start,
            window,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Records one frame at `now`. Returns `true` when a window closes and
    /// `fps` holds a fresh rate.
    pub fn count_one_frame(&mut self, now: Instant) -> bool {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return false;
        }

        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        true
    }

    /// Rate measured over the last completed window.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let start = Instant::now();
        let mut fps = FpsCalculator::starting_at(start, Duration::from_secs(2));

        for i in 1..120 {
            let t = start + Duration::from_millis(i * 16);
            assert!(!fps.count_one_frame(t));
        }
        assert_eq!(fps.fps(), 0.0);

        assert!(fps.count_one_frame(start + Duration::from_secs(2)));
        assert!((fps.fps() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn window_restarts_after_report() {
        let start = Instant::now();
        let mut fps = FpsCalculator::starting_at(start, Duration::from_secs(1));
        assert!(fps.count_one_frame(start + Duration::from_secs(1)));
        assert!(!fps.count_one_frame(start + Duration::from_millis(1500)));
        assert!(fps.count_one_frame(start + Duration::from_secs(2)));
        assert!((fps.fps() - 2.0).abs() < 1e-3);
    }
}
