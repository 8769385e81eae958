//! Frame pacing for a running session

use std::time::{Duration, Instant};

/// Caps the frame rate by tracking when the last frame was produced
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameClock {
    /// `fps` must be non-zero
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a frame may be produced at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Earliest instant the next frame may be produced
    pub fn next_deadline(&self, now: Instant) -> Instant {
        match self.last {
            Some(last) => last + self.interval,
            None => now,
        }
    }

    /// Record that a frame was produced at `now`
    pub fn tick(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Forget the last frame so a new session draws immediately
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirty_fps_interval() {
        let clock = FrameClock::new(30);
        assert_eq!(clock.interval(), Duration::from_nanos(33_333_333));
    }

    #[test]
    fn test_first_frame_is_due() {
        let clock = FrameClock::new(30);
        let now = Instant::now();
        assert!(clock.is_due(now));
        assert_eq!(clock.next_deadline(now), now);
    }

    #[test]
    fn test_throttles_until_interval() {
        let mut clock = FrameClock::new(30);
        let start = Instant::now();
        clock.tick(start);

        assert!(!clock.is_due(start + Duration::from_millis(10)));
        assert!(!clock.is_due(start + Duration::from_millis(33)));
        assert!(clock.is_due(start + Duration::from_millis(34)));
        assert_eq!(
            clock.next_deadline(start + Duration::from_millis(10)),
            start + clock.interval()
        );
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new(30);
        let start = Instant::now();
        clock.tick(start);
        clock.reset();
        assert!(clock.is_due(start));
    }
}
