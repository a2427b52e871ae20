//! Time sources and round-trip estimation

use crate::config::Tuning;
use log::debug;
use shared::FRAMES_PER_MS;
use std::cell::Cell;
use std::time::Instant;

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Smoothed round-trip time and the delays derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSync {
    srtt: Option<f64>,
    smoothing: f64,
    max_initial_delay: f64,
}

impl Default for ClockSync {
    fn default() -> Self {
        Self::new(&Tuning::default())
    }
}

impl ClockSync {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            srtt: None,
            smoothing: tuning.rtt_smoothing,
            max_initial_delay: tuning.max_initial_delay_ms,
        }
    }

    /// Folds a round-trip sample (ms) into the estimate. The first sample is taken as is.
    pub fn observe_rtt(&mut self, sample: f64) {
        let sample = sample.max(0.0);
        let srtt = match self.srtt {
            None => sample,
            Some(srtt) => (1.0 - self.smoothing) * srtt + self.smoothing * sample,
        };
        debug!("RTT sample {:.1}ms, smoothed {:.1}ms", sample, srtt);
        self.srtt = Some(srtt);
    }

    pub fn smoothed_rtt(&self) -> Option<f64> {
        self.srtt
    }

    /// Lead time (ms) the local simulation runs ahead of the server.
    pub fn initial_delay(&self) -> f64 {
        self.srtt.unwrap_or(0.0).clamp(0.0, self.max_initial_delay)
    }

    pub fn ping(&self) -> u32 {
        self.srtt.unwrap_or(0.0).round() as u32
    }

    /// Frames during which server updates for a ball the local paddle just hit are ignored.
    pub fn sync_suppression_frames(&self) -> u32 {
        (self.initial_delay() * FRAMES_PER_MS).ceil() as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_first_sample_is_taken_directly() {
        let mut sync = ClockSync::default();
        assert_eq!(sync.initial_delay(), 0.0);
        assert_eq!(sync.smoothed_rtt(), None);

        sync.observe_rtt(100.0);
        assert_eq!(sync.initial_delay(), 100.0);
        assert_eq!(sync.ping(), 100);
    }

    #[test]
    fn test_smoothing() {
        let mut sync = ClockSync::default();
        sync.observe_rtt(100.0);
        sync.observe_rtt(300.0);
        assert_approx_eq!(sync.initial_delay(), 125.0, 1e-9);
    }

    #[test]
    fn test_initial_delay_is_clamped() {
        let mut sync = ClockSync::default();
        sync.observe_rtt(900.0);
        assert_eq!(sync.initial_delay(), 200.0);
        assert_eq!(sync.ping(), 900);
    }

    #[test]
    fn test_suppression_frames() {
        let mut sync = ClockSync::default();
        assert_eq!(sync.sync_suppression_frames(), 1);
        sync.observe_rtt(110.0);
        assert_eq!(sync.sync_suppression_frames(), 8);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10.0);
        clock.advance(5.5);
        assert_eq!(clock.now_ms(), 15.5);
        clock.set(1.0);
        assert_eq!((&clock).now_ms(), 1.0);
    }
}
