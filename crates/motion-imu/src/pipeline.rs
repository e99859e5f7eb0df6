//! Per-event motion processing: frame transform, gravity split, smoothing.

use crate::filter::{CausalFilter, Smoothing};
use crate::rotation::to_earth_frame;
use crate::types::{AttitudeAngles, MotionSample, SensorEvent};
use glam::DVec3;
use std::fmt;

/// Values produced for one motion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReadout {
    /// Sign-flipped linear acceleration, device frame.
    pub accel_device: DVec3,
    /// Smoothed linear acceleration, earth frame.
    pub accel_earth: DVec3,
    /// Gravity, device frame.
    pub gravity_device: DVec3,
    /// Gravity, earth frame.
    pub gravity_earth: DVec3,
    /// Attitude in effect when the event was processed.
    pub attitude: AttitudeAngles,
}

impl MotionReadout {
    /// Plot values per axis series.
    pub fn axes(&self) -> [(&'static str, f64); 3] {
        [
            ("x", self.accel_earth.x),
            ("y", self.accel_earth.y),
            ("z", self.accel_earth.z),
        ]
    }
}

impl fmt::Display for MotionReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let angle = |a: Option<f64>| a.map_or_else(|| "-".to_string(), |v| v.to_string());

        writeln!(f, "ax_s: {}", self.accel_device.x)?;
        writeln!(f, "ay_s: {}", self.accel_device.y)?;
        writeln!(f, "az_s: {}", self.accel_device.z)?;
        writeln!(f, "----")?;
        writeln!(f, "ax_e: {}", self.accel_earth.x)?;
        writeln!(f, "ay_e: {}", self.accel_earth.y)?;
        writeln!(f, "az_e: {}", self.accel_earth.z)?;
        writeln!(f, "++++")?;
        writeln!(f, "gx_s: {}", self.gravity_device.x)?;
        writeln!(f, "gy_s: {}", self.gravity_device.y)?;
        writeln!(f, "gz_s: {}", self.gravity_device.z)?;
        writeln!(f, "----")?;
        writeln!(f, "gx_e: {}", self.gravity_earth.x)?;
        writeln!(f, "gy_e: {}", self.gravity_earth.y)?;
        writeln!(f, "gz_e: {}", self.gravity_earth.z)?;
        writeln!(f, "++++")?;
        writeln!(f, "alpha: {}", angle(self.attitude.alpha))?;
        writeln!(f, "beta: {}", angle(self.attitude.beta))?;
        write!(f, "gamma: {}", angle(self.attitude.gamma))
    }
}

/// Holds the latest attitude and the smoothing stage for linear acceleration.
pub struct MotionPipeline {
    attitude: AttitudeAngles,
    smoothing: Smoothing,
    ignore_heading: bool,
}

impl MotionPipeline {
    pub fn new(smoothing: Smoothing, ignore_heading: bool) -> Self {
        Self {
            attitude: AttitudeAngles::default(),
            smoothing,
            ignore_heading,
        }
    }

    pub fn attitude(&self) -> AttitudeAngles {
        self.attitude
    }

    pub fn on_orientation(&mut self, angles: AttitudeAngles) {
        self.attitude = angles;
    }

    pub fn on_motion(&mut self, sample: &MotionSample) -> MotionReadout {
        let gravity_device = sample.gravity();
        let gravity_earth = to_earth_frame(gravity_device, self.attitude);

        let accel_device = -sample.acceleration;
        let accel_attitude = if self.ignore_heading {
            self.attitude.without_heading()
        } else {
            self.attitude
        };
        let accel_earth = self
            .smoothing
            .filter(to_earth_frame(accel_device, accel_attitude));

        MotionReadout {
            accel_device,
            accel_earth,
            gravity_device,
            gravity_earth,
            attitude: self.attitude,
        }
    }

    /// Apply one event. Returns a readout for motion events only.
    pub fn handle(&mut self, event: &SensorEvent) -> Option<MotionReadout> {
        match event {
            SensorEvent::Orientation(angles) => {
                self.on_orientation(*angles);
                None
            }
            SensorEvent::Motion(sample) => Some(self.on_motion(sample)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::LowPassFilter;

    fn sample(accel: DVec3, with_gravity: DVec3) -> MotionSample {
        MotionSample {
            acceleration: accel,
            acceleration_including_gravity: with_gravity,
        }
    }

    fn passthrough(ignore_heading: bool) -> MotionPipeline {
        MotionPipeline::new(Smoothing::Passthrough(DVec3::ZERO), ignore_heading)
    }

    #[test]
    fn gravity_is_difference_of_readings() {
        let mut pipeline = passthrough(true);
        let readout = pipeline.on_motion(&sample(
            DVec3::new(0.5, 0.0, -0.25),
            DVec3::new(0.5, 0.0, 9.56),
        ));

        assert!((readout.gravity_device - DVec3::new(0.0, 0.0, 9.81)).length() < 1e-12);
        // No attitude yet, so earth frame equals device frame.
        assert_eq!(readout.gravity_earth, readout.gravity_device);
    }

    #[test]
    fn acceleration_is_sign_flipped() {
        let mut pipeline = passthrough(true);
        let readout = pipeline.on_motion(&sample(DVec3::new(1.0, -2.0, 3.0), DVec3::ZERO));

        assert_eq!(readout.accel_device, DVec3::new(-1.0, 2.0, -3.0));
        assert_eq!(readout.accel_earth, readout.accel_device);
    }

    #[test]
    fn heading_is_dropped_for_acceleration_only() {
        let mut pipeline = passthrough(true);
        pipeline.on_orientation(AttitudeAngles::new(90.0, 0.0, 0.0));

        let readout = pipeline.on_motion(&sample(DVec3::new(-1.0, 0.0, 0.0), DVec3::ZERO));

        // Acceleration ignores the 90 degree heading.
        assert!((readout.accel_earth - DVec3::X).length() < 1e-12);
        // Gravity (here 1 m/s^2 along X) is rotated by the full attitude.
        assert!((readout.gravity_earth - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn heading_kept_when_configured() {
        let mut pipeline = passthrough(false);
        pipeline.on_orientation(AttitudeAngles::new(90.0, 0.0, 0.0));

        let readout = pipeline.on_motion(&sample(DVec3::new(-1.0, 0.0, 0.0), DVec3::ZERO));
        assert!((readout.accel_earth - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn low_pass_smooths_earth_acceleration() {
        let mut pipeline = MotionPipeline::new(Smoothing::LowPass(LowPassFilter::default()), true);
        let readout = pipeline.on_motion(&sample(DVec3::new(0.0, 0.0, -5.0), DVec3::ZERO));

        assert!((readout.accel_earth.z - 1.0).abs() < 1e-12);
        let [_, _, (name, value)] = readout.axes();
        assert_eq!(name, "z");
        assert_eq!(value, readout.accel_earth.z);
    }

    #[test]
    fn handle_dispatches_events() {
        let mut pipeline = passthrough(true);
        let angles = AttitudeAngles::new(10.0, 20.0, 30.0);

        assert!(pipeline.handle(&SensorEvent::Orientation(angles)).is_none());
        assert_eq!(pipeline.attitude(), angles);

        let readout = pipeline
            .handle(&SensorEvent::Motion(sample(DVec3::ZERO, DVec3::ZERO)))
            .unwrap();
        assert_eq!(readout.attitude, angles);
    }

    #[test]
    fn readout_text_lists_every_value() {
        let mut pipeline = passthrough(true);
        pipeline.on_orientation(AttitudeAngles {
            alpha: None,
            beta: Some(45.0),
            gamma: Some(-10.0),
        });
        let text = pipeline
            .on_motion(&sample(DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO))
            .to_string();

        assert!(text.starts_with("ax_s: -1\n"));
        assert!(text.contains("alpha: -\n"));
        assert!(text.contains("beta: 45\n"));
        assert!(text.ends_with("gamma: -10"));
        assert_eq!(text.lines().count(), 19);
    }
}
