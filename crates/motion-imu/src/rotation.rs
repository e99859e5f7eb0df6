//! Device-frame to earth-frame rotation.
//!
//! The matrix follows the device-orientation ZXY convention: heading `alpha`
//! about Z, then `beta` about X, then `gamma` about Y. Entries are written out
//! term by term so results match other implementations of the same convention
//! up to rounding.

use crate::types::AttitudeAngles;
use glam::DVec3;

/// 3x3 rotation matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix {
    rows: [[f64; 3]; 3],
}

impl RotationMatrix {
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Build the ZXY rotation for the given attitude.
    ///
    /// `None` angles contribute no rotation on their axis. NaN and infinite
    /// angles are not checked and propagate into the entries.
    pub fn from_attitude(angles: AttitudeAngles) -> Self {
        let x = angles.beta.unwrap_or(0.0).to_radians();
        let y = angles.gamma.unwrap_or(0.0).to_radians();
        let z = angles.alpha.unwrap_or(0.0).to_radians();

        let (s_x, c_x) = x.sin_cos();
        let (s_y, c_y) = y.sin_cos();
        let (s_z, c_z) = z.sin_cos();

        Self {
            rows: [
                [
                    c_z * c_y - s_z * s_x * s_y,
                    -c_x * s_z,
                    c_y * s_z * s_x + c_z * s_y,
                ],
                [
                    c_y * s_z + c_z * s_x * s_y,
                    c_z * c_x,
                    s_z * s_y - c_z * c_y * s_x,
                ],
                [-c_x * s_y, s_x, c_x * c_y],
            ],
        }
    }

    /// Element at `row`, `col`. Panics if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn rows(&self) -> [[f64; 3]; 3] {
        self.rows
    }

    /// Matrix-vector product.
    pub fn apply(&self, v: DVec3) -> DVec3 {
        let [r0, r1, r2] = self.rows;
        DVec3::new(
            v.x * r0[0] + v.y * r0[1] + v.z * r0[2],
            v.x * r1[0] + v.y * r1[1] + v.z * r1[2],
            v.x * r2[0] + v.y * r2[1] + v.z * r2[2],
        )
    }

    pub fn transpose(&self) -> Self {
        let r = self.rows;
        Self {
            rows: [
                [r[0][0], r[1][0], r[2][0]],
                [r[0][1], r[1][1], r[2][1]],
                [r[0][2], r[1][2], r[2][2]],
            ],
        }
    }
}

/// Rotate a device-frame vector into the earth frame.
pub fn to_earth_frame(v: DVec3, angles: AttitudeAngles) -> DVec3 {
    RotationMatrix::from_attitude(angles).apply(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_vec_eq(a: DVec3, b: DVec3) {
        assert!((a - b).abs().max_element() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn zero_angles_are_identity() {
        let m = RotationMatrix::from_attitude(AttitudeAngles::new(0.0, 0.0, 0.0));
        assert_eq!(m, RotationMatrix::IDENTITY);

        let v = DVec3::new(1.5, -2.0, 9.81);
        assert_eq!(to_earth_frame(v, AttitudeAngles::new(0.0, 0.0, 0.0)), v);
    }

    #[test]
    fn missing_angles_are_identity() {
        let m = RotationMatrix::from_attitude(AttitudeAngles::default());
        assert_eq!(m, RotationMatrix::IDENTITY);
    }

    #[test]
    fn quarter_turn_about_each_axis() {
        // Heading: X rotates onto Y.
        let v = to_earth_frame(DVec3::X, AttitudeAngles::new(90.0, 0.0, 0.0));
        assert_vec_eq(v, DVec3::Y);

        // Front-back tilt: Y rotates onto Z.
        let v = to_earth_frame(DVec3::Y, AttitudeAngles::new(0.0, 90.0, 0.0));
        assert_vec_eq(v, DVec3::Z);

        // Left-right tilt: X rotates onto -Z.
        let v = to_earth_frame(DVec3::X, AttitudeAngles::new(0.0, 0.0, 90.0));
        assert_vec_eq(v, DVec3::NEG_Z);
    }

    #[test]
    fn entries_follow_zxy_layout() {
        let angles = AttitudeAngles::new(30.0, 45.0, -60.0);
        let m = RotationMatrix::from_attitude(angles);

        let (sx, cx) = 45f64.to_radians().sin_cos();
        let (sy, cy) = (-60f64).to_radians().sin_cos();
        let (sz, cz) = 30f64.to_radians().sin_cos();

        assert!((m.get(0, 0) - (cz * cy - sz * sx * sy)).abs() < EPS);
        assert!((m.get(0, 1) - (-cx * sz)).abs() < EPS);
        assert!((m.get(1, 2) - (sz * sy - cz * cy * sx)).abs() < EPS);
        assert!((m.get(2, 0) - (-cx * sy)).abs() < EPS);
        assert!((m.get(2, 1) - sx).abs() < EPS);
        assert!((m.get(2, 2) - cx * cy).abs() < EPS);
    }

    #[test]
    fn matrix_is_orthonormal() {
        for angles in [
            AttitudeAngles::new(10.0, 20.0, 30.0),
            AttitudeAngles::new(359.0, -179.0, 89.0),
            AttitudeAngles::new(-45.0, 0.5, -90.0),
        ] {
            let m = RotationMatrix::from_attitude(angles);
            let mt = m.transpose();
            for i in 0..3 {
                let row = DVec3::from_array(m.rows()[i]);
                for j in 0..3 {
                    let col = DVec3::from_array(mt.rows()[j]);
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!((row.dot(col) - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn transform_is_linear() {
        let angles = AttitudeAngles::new(12.0, -33.0, 71.0);
        let v1 = DVec3::new(1.0, 2.0, 3.0);
        let v2 = DVec3::new(-0.5, 4.0, 0.25);
        let (a, b) = (2.5, -1.5);

        let lhs = to_earth_frame(a * v1 + b * v2, angles);
        let rhs = a * to_earth_frame(v1, angles) + b * to_earth_frame(v2, angles);
        assert!((lhs - rhs).abs().max_element() < 1e-9);
    }

    #[test]
    fn length_is_preserved() {
        let v = DVec3::new(0.3, -9.7, 1.2);
        let rotated = to_earth_frame(v, AttitudeAngles::new(200.0, 15.0, -40.0));
        assert!((rotated.length() - v.length()).abs() < 1e-9);
    }

    #[test]
    fn nan_angle_propagates() {
        let angles = AttitudeAngles {
            alpha: Some(f64::NAN),
            beta: None,
            gamma: None,
        };
        let v = to_earth_frame(DVec3::X, angles);
        assert!(v.x.is_nan());
    }
}
