//! Frame clock.

#[cfg(not(feature = "web"))]
use std::time::Instant;

/// Measures time between frames and since start.
///
/// With the `web` feature the clock reads `performance.now()`.
#[derive(Debug, Clone)]
pub struct Clock {
    start: f64,
    last: f64,
    #[cfg(not(feature = "web"))]
    origin: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Start a clock now.
    pub fn new() -> Self {
        let mut clock = Self {
            start: 0.0,
            last: 0.0,
            #[cfg(not(feature = "web"))]
            origin: Instant::now(),
        };
        clock.start = clock.now();
        clock.last = clock.start;
        clock
    }

    #[cfg(feature = "web")]
    fn now(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now() / 1000.0)
            .unwrap_or(0.0)
    }

    #[cfg(not(feature = "web"))]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    /// Seconds since the previous `tick`, or since start on the first call.
    pub fn tick(&mut self) -> f32 {
        let now = self.now();
        let delta = now - self.last;
        self.last = now;
        delta as f32
    }

    /// Seconds since start.
    pub fn elapsed(&self) -> f32 {
        (self.now() - self.start) as f32
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        self.start = self.now();
        self.last = self.start;
    }
}

#[cfg(all(test, not(feature = "web")))]
mod tests {
    use super::*;

    #[test]
    fn test_tick_and_elapsed_advance() {
        let mut clock = Clock::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let delta = clock.tick();
        assert!(delta > 0.0);
        assert!(clock.elapsed() >= delta);
        clock.reset();
        assert!(clock.elapsed() < delta + 1.0);
    }
}
