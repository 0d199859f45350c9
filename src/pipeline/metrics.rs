use std::collections::VecDeque;
use std::time::Instant;

/// Timings collected while processing one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameMetrics {
    pub perception_duration_us: u64,
    pub evaluation_duration_us: u64,
    pub total_processing_duration_us: u64,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finalize(&mut self, start_time: Instant) {
        self.total_processing_duration_us = start_time.elapsed().as_micros() as u64;
    }
}

/// Rolling-window frames-per-second estimate.
pub struct FpsTracker {
    frame_times: VecDeque<Instant>,
    window: usize,
}

impl FpsTracker {
    pub fn new(window: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(window + 1),
            window,
        }
    }

    /// Record a frame time and return the current estimate; 0.0 until two
    /// frames have been seen.
    pub fn tick(&mut self, now: Instant) -> f32 {
        self.frame_times.push_back(now);
        while self.frame_times.len() > self.window {
            self.frame_times.pop_front();
        }
        match (self.frame_times.front(), self.frame_times.back()) {
            (Some(first), Some(last)) if self.frame_times.len() > 1 => {
                let span = last.duration_since(*first).as_secs_f32();
                if span > 0.0 {
                    self.frame_times.len() as f32 / span
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn single_frame_reports_zero() {
        let mut tracker = FpsTracker::new(30);
        assert_eq!(tracker.tick(Instant::now()), 0.0);
    }

    #[test]
    fn steady_cadence_converges_on_frame_rate() {
        let mut tracker = FpsTracker::new(30);
        let start = Instant::now();
        let mut fps = 0.0;
        for i in 0..30 {
            fps = tracker.tick(start + Duration::from_millis(33 * i));
        }
        assert!(fps > 25.0 && fps < 35.0, "fps was {}", fps);
    }

    #[test]
    fn window_bounds_retained_samples() {
        let mut tracker = FpsTracker::new(5);
        let start = Instant::now();
        for i in 0..50 {
            tracker.tick(start + Duration::from_millis(10 * i));
        }
        assert!(tracker.frame_times.len() <= 5);
    }
}
