//! Causal smoothing filters over 3-vectors.
//!
//! Each filter owns its state exclusively and updates it in place on every
//! call. One instance per signal path.

use glam::DVec3;
use std::time::Instant;

/// Default high-pass time constant, seconds.
pub const DEFAULT_CUTOFF: f64 = 0.8;
/// Default low-pass bias.
pub const DEFAULT_BIAS: f64 = 0.8;

/// A filter consuming one sample per call and emitting one smoothed sample.
pub trait CausalFilter {
    fn filter(&mut self, raw: DVec3) -> DVec3;

    /// Last emitted value (the initial state before the first call).
    fn last(&self) -> DVec3;
}

/// Time-adaptive exponential filter.
///
/// `alpha = cutoff / (cutoff + dt)` where `dt` is the wall-clock time since the
/// previous call. Short gaps keep `alpha` near 1 and the output follows the
/// input closely; long gaps push `alpha` toward 0 and hold the previous output.
#[derive(Debug, Clone)]
pub struct HighPassFilter {
    last: DVec3,
    cutoff: f64,
    timestamp: Instant,
}

impl HighPassFilter {
    pub fn new(initial: DVec3, cutoff: f64) -> Self {
        Self::starting_at(initial, cutoff, Instant::now())
    }

    /// Construct with an explicit creation time. The first call measures `dt`
    /// from `start`.
    pub fn starting_at(initial: DVec3, cutoff: f64, start: Instant) -> Self {
        Self {
            last: initial,
            cutoff,
            timestamp: start,
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Filter one sample observed at `now`.
    ///
    /// A `now` earlier than the previous call counts as `dt = 0`.
    pub fn filter_at(&mut self, raw: DVec3, now: Instant) -> DVec3 {
        let dt = now.saturating_duration_since(self.timestamp).as_secs_f64();
        let alpha = self.cutoff / (self.cutoff + dt);

        self.timestamp = now;
        self.last += alpha * (raw - self.last);
        self.last
    }
}

impl Default for HighPassFilter {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DEFAULT_CUTOFF)
    }
}

impl CausalFilter for HighPassFilter {
    fn filter(&mut self, raw: DVec3) -> DVec3 {
        self.filter_at(raw, Instant::now())
    }

    fn last(&self) -> DVec3 {
        self.last
    }
}

/// Fixed-weight exponential moving average: `last = last * bias + raw * (1 - bias)`.
///
/// `bias` is expected in `0.0..1.0` but is not checked.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    last: DVec3,
    bias: f64,
}

impl LowPassFilter {
    pub fn new(initial: DVec3, bias: f64) -> Self {
        Self {
            last: initial,
            bias,
        }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl Default for LowPassFilter {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DEFAULT_BIAS)
    }
}

impl CausalFilter for LowPassFilter {
    fn filter(&mut self, raw: DVec3) -> DVec3 {
        self.last = self.last * self.bias + raw * (1.0 - self.bias);
        self.last
    }

    fn last(&self) -> DVec3 {
        self.last
    }
}

/// Smoothing stage selected at runtime.
#[derive(Debug, Clone)]
pub enum Smoothing {
    LowPass(LowPassFilter),
    HighPass(HighPassFilter),
    /// No smoothing. `last` reports the previous input.
    Passthrough(DVec3),
}

impl CausalFilter for Smoothing {
    fn filter(&mut self, raw: DVec3) -> DVec3 {
        match self {
            Smoothing::LowPass(f) => f.filter(raw),
            Smoothing::HighPass(f) => f.filter(raw),
            Smoothing::Passthrough(last) => {
                *last = raw;
                raw
            }
        }
    }

    fn last(&self) -> DVec3 {
        match self {
            Smoothing::LowPass(f) => f.last(),
            Smoothing::HighPass(f) => f.last(),
            Smoothing::Passthrough(last) => *last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn high_pass_with_one_second_steps() {
        let start = Instant::now();
        let mut hpf = HighPassFilter::starting_at(DVec3::ZERO, 0.8, start);
        let raw = DVec3::new(1.0, 0.0, 0.0);
        let alpha = 0.8 / 1.8;

        let first = hpf.filter_at(raw, start + Duration::from_secs(1));
        assert!((first.x - alpha).abs() < 1e-9);
        assert_eq!(first.y, 0.0);
        assert_eq!(first.z, 0.0);

        let second = hpf.filter_at(raw, start + Duration::from_secs(2));
        let expected = alpha + alpha * (1.0 - alpha);
        assert!((second.x - expected).abs() < 1e-9);
        assert!((second.x - 0.691).abs() < 1e-3);
        assert_eq!(hpf.last(), second);
    }

    #[test]
    fn high_pass_zero_dt_tracks_raw() {
        let start = Instant::now();
        let mut hpf = HighPassFilter::starting_at(DVec3::new(5.0, 5.0, 5.0), 0.8, start);
        let raw = DVec3::new(1.0, -2.0, 3.0);

        assert_eq!(hpf.filter_at(raw, start), raw);
        assert_eq!(hpf.filter_at(raw, start), raw);
    }

    #[test]
    fn high_pass_clock_going_backwards_is_zero_dt() {
        let start = Instant::now() + Duration::from_secs(10);
        let mut hpf = HighPassFilter::starting_at(DVec3::ZERO, 0.8, start);
        let raw = DVec3::splat(2.0);

        assert_eq!(hpf.filter_at(raw, start - Duration::from_secs(5)), raw);
    }

    #[test]
    fn high_pass_large_cutoff_passes_raw() {
        let start = Instant::now();
        let mut hpf = HighPassFilter::starting_at(DVec3::ZERO, 1e9, start);
        let raw = DVec3::new(0.5, -0.25, 4.0);

        let out = hpf.filter_at(raw, start + Duration::from_millis(16));
        assert!((out - raw).abs().max_element() < 1e-9);
    }

    #[test]
    fn high_pass_long_gap_holds_state() {
        let start = Instant::now();
        let initial = DVec3::new(1.0, 1.0, 1.0);
        let mut hpf = HighPassFilter::starting_at(initial, 0.8, start);

        let out = hpf.filter_at(DVec3::ZERO, start + Duration::from_secs(100_000));
        assert!((out - initial).abs().max_element() < 1e-4);
    }

    #[test]
    fn low_pass_single_step() {
        let mut lpf = LowPassFilter::default();
        let out = lpf.filter(DVec3::new(1.0, 2.0, -3.0));
        assert!((out - DVec3::new(0.2, 0.4, -0.6)).abs().max_element() < 1e-12);
    }

    #[test]
    fn low_pass_converges_without_overshoot() {
        let target = DVec3::new(9.81, -1.0, 0.5);
        for initial in [DVec3::ZERO, DVec3::new(20.0, -5.0, 3.0)] {
            let mut lpf = LowPassFilter::new(initial, 0.8);
            let mut prev_gap = (target - initial).abs();

            for _ in 0..60 {
                let out = lpf.filter(target);
                let gap = (target - out).abs();
                // Never crosses the target and never moves away from it.
                assert!(gap.cmple(prev_gap).all());
                for axis in 0..3 {
                    let side = (initial[axis] - target[axis]).signum();
                    assert!((out[axis] - target[axis]) * side >= 0.0);
                }
                prev_gap = gap;
            }

            assert!((lpf.last() - target).abs().max_element() < 1e-3);
        }
    }

    #[test]
    fn low_pass_ignores_time() {
        let mut a = LowPassFilter::new(DVec3::ZERO, 0.5);
        let mut b = LowPassFilter::new(DVec3::ZERO, 0.5);

        let raw = DVec3::new(4.0, 0.0, 0.0);
        a.filter(raw);
        std::thread::sleep(Duration::from_millis(5));
        let late = a.filter(raw);

        b.filter(raw);
        assert_eq!(late, b.filter(raw));
        assert_eq!(late, DVec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn passthrough_returns_input() {
        let mut smoothing = Smoothing::Passthrough(DVec3::ZERO);
        let raw = DVec3::new(0.1, 0.2, 0.3);
        assert_eq!(smoothing.filter(raw), raw);
        assert_eq!(smoothing.last(), raw);
    }
}
