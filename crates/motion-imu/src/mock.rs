//! Synthetic sensor source for running without a device.

use crate::types::{AttitudeAngles, MotionSample, SensorEvent};
use glam::DVec3;

const GRAVITY: f64 = 9.81;

/// Rate used when the requested one is not a finite number.
pub const DEFAULT_RATE_HZ: f64 = 60.0;
/// Accepted rate range. The upper bound keeps the tick period well above zero.
pub const MIN_RATE_HZ: f64 = 1.0;
pub const MAX_RATE_HZ: f64 = 10_000.0;

/// Deterministic motion generator.
///
/// The device slowly turns and rocks while shaking along its own X and Z axes,
/// so every plotted axis has something to show.
#[derive(Debug, Clone)]
pub struct SyntheticMotion {
    rate_hz: f64,
    tick: u64,
}

impl SyntheticMotion {
    /// Rates are clamped to `MIN_RATE_HZ..=MAX_RATE_HZ`; NaN and infinities
    /// fall back to `DEFAULT_RATE_HZ`.
    pub fn new(rate_hz: f64) -> Self {
        let rate_hz = if rate_hz.is_finite() {
            rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ)
        } else {
            DEFAULT_RATE_HZ
        };
        Self { rate_hz, tick: 0 }
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Seconds since the generator started.
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 / self.rate_hz
    }

    /// Attitude and motion at time `t` seconds.
    pub fn sample_at(t: f64) -> (AttitudeAngles, MotionSample) {
        let attitude = AttitudeAngles::new(
            (t * 20.0).rem_euclid(360.0),
            15.0 * (t * 0.7).sin(),
            10.0 * (t * 0.4).cos(),
        );

        let acceleration = DVec3::new(
            2.0 * (t * std::f64::consts::TAU * 0.8).sin(),
            0.5 * (t * std::f64::consts::TAU * 2.1).sin(),
            1.5 * (t * std::f64::consts::TAU * 0.3).cos(),
        );

        // Gravity seen by the tilted device: earth-down rotated back into the
        // device frame, ignoring heading.
        let (sb, cb) = attitude.beta.unwrap_or(0.0).to_radians().sin_cos();
        let (sg, cg) = attitude.gamma.unwrap_or(0.0).to_radians().sin_cos();
        let gravity = GRAVITY * DVec3::new(-cb * sg, sb, cb * cg);

        let motion = MotionSample {
            acceleration,
            acceleration_including_gravity: acceleration + gravity,
        };

        (attitude, motion)
    }

    /// Events for the next tick: an orientation update followed by a motion reading.
    pub fn next_events(&mut self) -> [SensorEvent; 2] {
        let (attitude, motion) = Self::sample_at(self.elapsed());
        self.tick += 1;
        [
            SensorEvent::Orientation(attitude),
            SensorEvent::Motion(motion),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::to_earth_frame;

    #[test]
    fn events_alternate_orientation_then_motion() {
        let mut synth = SyntheticMotion::new(50.0);
        let [first, second] = synth.next_events();
        assert!(matches!(first, SensorEvent::Orientation(_)));
        assert!(matches!(second, SensorEvent::Motion(_)));
        assert!((synth.elapsed() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn gravity_points_down_in_earth_frame() {
        for t in [0.0, 0.37, 2.5, 11.0] {
            let (attitude, motion) = SyntheticMotion::sample_at(t);
            let earth = to_earth_frame(motion.gravity(), attitude.without_heading());
            assert!((earth - DVec3::new(0.0, 0.0, GRAVITY)).length() < 1e-9, "t={t}");
        }
    }

    #[test]
    fn generator_is_deterministic() {
        let mut a = SyntheticMotion::new(60.0);
        let mut b = SyntheticMotion::new(60.0);
        for _ in 0..10 {
            assert_eq!(a.next_events(), b.next_events());
        }
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(SyntheticMotion::new(0.0).rate_hz(), MIN_RATE_HZ);
        assert_eq!(SyntheticMotion::new(-5.0).rate_hz(), MIN_RATE_HZ);
        assert_eq!(SyntheticMotion::new(1e12).rate_hz(), MAX_RATE_HZ);
        assert_eq!(SyntheticMotion::new(250.0).rate_hz(), 250.0);
    }

    #[test]
    fn non_finite_rate_uses_default() {
        for rate in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let synth = SyntheticMotion::new(rate);
            assert_eq!(synth.rate_hz(), DEFAULT_RATE_HZ, "rate={rate}");
            assert!(std::time::Duration::from_secs_f64(1.0 / synth.rate_hz()) > std::time::Duration::ZERO);
        }
    }
}
