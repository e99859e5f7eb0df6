use glam::DVec3;

/// Device attitude in degrees, device-orientation convention.
///
/// A missing angle is treated as zero by the frame transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttitudeAngles {
    /// Compass heading, rotation about the vertical (Z) axis.
    pub alpha: Option<f64>,
    /// Front-back tilt, rotation about X.
    pub beta: Option<f64>,
    /// Left-right tilt, rotation about Y.
    pub gamma: Option<f64>,
}

impl AttitudeAngles {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// Same attitude with the heading dropped.
    pub fn without_heading(self) -> Self {
        Self {
            alpha: None,
            ..self
        }
    }
}

/// One motion reading in the device frame (m/s^2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Linear acceleration with gravity removed by the sensor.
    pub acceleration: DVec3,
    /// Raw acceleration including gravity.
    pub acceleration_including_gravity: DVec3,
}

impl MotionSample {
    /// Gravity component, derived as the difference of the two readings.
    pub fn gravity(&self) -> DVec3 {
        self.acceleration_including_gravity - self.acceleration
    }
}

/// Event delivered by a sensor source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    Orientation(AttitudeAngles),
    Motion(MotionSample),
}
