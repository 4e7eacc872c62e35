//! Frame timing

use std::time::{Duration, Instant};

/// Tracks elapsed time since start and the delta of the last frame.
///
/// `update` is called once per frame; `elapsed` and `delta` report the values
/// captured at that moment, so every system reading them in the same frame
/// sees the same time.
pub struct Timer {
    start: Instant,
    last_frame: Instant,
    elapsed: Duration,
    delta: Duration,
    frame_count: u64,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    fn update_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.elapsed = now.saturating_duration_since(self.start);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Seconds since the timer was created, as of the last `update`
    pub fn elapsed(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn delta(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_frozen_between_updates() {
        let mut timer = Timer::new();
        assert_eq!(timer.elapsed(), 0.0);

        let start = timer.start;
        timer.update_at(start + Duration::from_millis(1500));
        assert!((timer.elapsed() - 1.5).abs() < 1e-6);
        assert!((timer.delta() - 1.5).abs() < 1e-6);

        timer.update_at(start + Duration::from_millis(1600));
        assert!((timer.elapsed() - 1.6).abs() < 1e-6);
        assert!((timer.delta() - 0.1).abs() < 1e-5);
        assert_eq!(timer.frame_count(), 2);
    }
}
