//! # Geometry module
//!
//! Planar value types shared by every other module: a [`Translation`] (a
//! point or vector in a plane), a [`Rotation`] (a heading) and a [`Pose`]
//! combining the two.
//!
//! Frames follow the usual convention: X forward, Y to the left and
//! rotations anticlockwise-positive about Z. Field-frame quantities are
//! named without a suffix, robot-body frame vectors are suffixed `_rb`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitComplex, Vector2};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

// Internal
use util::maths::{get_ang_dist, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point or vector in the plane.
///
/// Units: meters
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub x_m: f64,
    pub y_m: f64,
}

/// A rotation in the plane, i.e. a heading.
///
/// Stored as a unit complex number so that composition and inversion never
/// need to re-wrap the angle. Serialised as an angle in radians.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Rotation {
    uc: UnitComplex<f64>,
}

/// The position and heading of the robot in the field frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the robot's centre of rotation.
    pub translation: Translation,

    /// Heading of the robot, angle from the field X axis to the robot's
    /// forward direction.
    pub rotation: Rotation,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Translation {
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self { x_m, y_m }
    }

    /// Length of the vector.
    pub fn norm(&self) -> f64 {
        self.x_m.hypot(self.y_m)
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Translation) -> f64 {
        (*other - *self).norm()
    }

    /// Rotate the vector anticlockwise by the given rotation.
    pub fn rotate_by(&self, rotation: &Rotation) -> Translation {
        (rotation.uc * Vector2::from(*self)).into()
    }

    /// Direction of the vector, or `None` for the zero vector.
    pub fn angle(&self) -> Option<Rotation> {
        if self.x_m == 0.0 && self.y_m == 0.0 {
            None
        } else {
            Some(Rotation::from_radians(self.y_m.atan2(self.x_m)))
        }
    }
}

impl Rotation {
    /// Create a rotation from an angle in radians.
    pub fn from_radians(angle_rad: f64) -> Self {
        Self {
            uc: UnitComplex::new(angle_rad),
        }
    }

    /// Create a rotation from an angle in degrees.
    pub fn from_degrees(angle_deg: f64) -> Self {
        Self::from_radians(angle_deg.to_radians())
    }

    /// The zero rotation.
    pub fn identity() -> Self {
        Self {
            uc: UnitComplex::identity(),
        }
    }

    /// The angle of the rotation in the range (-pi, pi].
    pub fn radians(&self) -> f64 {
        wrap_pi(self.uc.angle())
    }

    /// The angle of the rotation in degrees, in the range (-180, 180].
    pub fn degrees(&self) -> f64 {
        self.radians().to_degrees()
    }

    pub fn cos(&self) -> f64 {
        self.uc.cos_angle()
    }

    pub fn sin(&self) -> f64 {
        self.uc.sin_angle()
    }

    /// Apply `other` after this rotation.
    pub fn rotate_by(&self, other: &Rotation) -> Rotation {
        Rotation {
            uc: other.uc * self.uc,
        }
    }

    /// The rotation which undoes this one.
    pub fn inverse(&self) -> Rotation {
        Rotation {
            uc: self.uc.inverse(),
        }
    }

    /// Interpolate from this rotation to `other` along the shortest arc.
    ///
    /// `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn interpolate(&self, other: &Rotation, t: f64) -> Rotation {
        let delta_rad = get_ang_dist(self.radians(), other.radians());
        self.rotate_by(&Rotation::from_radians(delta_rad * t))
    }
}

impl Pose {
    pub fn new(translation: Translation, rotation: Rotation) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Build a pose from field coordinates and a heading in radians.
    pub fn from_xy_heading(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self::new(Translation::new(x_m, y_m), Rotation::from_radians(heading_rad))
    }

    pub fn x_m(&self) -> f64 {
        self.translation.x_m
    }

    pub fn y_m(&self) -> f64 {
        self.translation.y_m
    }

    /// Heading of the pose in radians, in the range (-pi, pi].
    pub fn heading_rad(&self) -> f64 {
        self.rotation.radians()
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<f64> for Rotation {
    fn from(angle_rad: f64) -> Self {
        Rotation::from_radians(angle_rad)
    }
}

impl From<Rotation> for f64 {
    fn from(rotation: Rotation) -> Self {
        rotation.radians()
    }
}

impl From<Vector2<f64>> for Translation {
    fn from(v: Vector2<f64>) -> Self {
        Translation::new(v[0], v[1])
    }
}

impl From<Translation> for Vector2<f64> {
    fn from(t: Translation) -> Self {
        Vector2::new(t.x_m, t.y_m)
    }
}

impl Add for Translation {
    type Output = Translation;

    fn add(self, rhs: Translation) -> Translation {
        Translation::new(self.x_m + rhs.x_m, self.y_m + rhs.y_m)
    }
}

impl Sub for Translation {
    type Output = Translation;

    fn sub(self, rhs: Translation) -> Translation {
        Translation::new(self.x_m - rhs.x_m, self.y_m - rhs.y_m)
    }
}

impl Neg for Translation {
    type Output = Translation;

    fn neg(self) -> Translation {
        Translation::new(-self.x_m, -self.y_m)
    }
}

impl Mul<f64> for Translation {
    type Output = Translation;

    fn mul(self, rhs: f64) -> Translation {
        Translation::new(self.x_m * rhs, self.y_m * rhs)
    }
}

impl Div<f64> for Translation {
    type Output = Translation;

    fn div(self, rhs: f64) -> Translation {
        Translation::new(self.x_m / rhs, self.y_m / rhs)
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        self.rotate_by(&rhs)
    }
}

impl Sub for Rotation {
    type Output = Rotation;

    fn sub(self, rhs: Rotation) -> Rotation {
        self.rotate_by(&rhs.inverse())
    }
}

impl Neg for Rotation {
    type Output = Rotation;

    fn neg(self) -> Rotation {
        self.inverse()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_translation_ops() {
        let a = Translation::new(1.0, 2.0);
        let b = Translation::new(4.0, 6.0);

        assert_eq!(a + b, Translation::new(5.0, 8.0));
        assert_eq!(b - a, Translation::new(3.0, 4.0));
        assert_eq!(-a, Translation::new(-1.0, -2.0));
        assert_eq!(a * 2.0, Translation::new(2.0, 4.0));
        assert_eq!(b / 2.0, Translation::new(2.0, 3.0));
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(Translation::new(3.0, 4.0).norm(), 5.0);
    }

    #[test]
    fn test_translation_rotate() {
        let v = Translation::new(1.0, 0.0).rotate_by(&Rotation::from_radians(FRAC_PI_2));
        assert!(v.x_m.abs() < EPS);
        assert!((v.y_m - 1.0).abs() < EPS);

        let v = Translation::new(0.3, 0.3).rotate_by(&Rotation::from_radians(PI));
        assert!((v.x_m + 0.3).abs() < EPS);
        assert!((v.y_m + 0.3).abs() < EPS);
    }

    #[test]
    fn test_translation_angle() {
        assert!(Translation::default().angle().is_none());

        let a = Translation::new(-1.0, 1.0).angle().unwrap();
        assert!((a.radians() - 3.0 * FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn test_rotation_composition() {
        let a = Rotation::from_radians(FRAC_PI_2);
        let b = Rotation::from_radians(FRAC_PI_4);

        assert!(((a + b).radians() - 3.0 * FRAC_PI_4).abs() < EPS);
        assert!(((a - b).radians() - FRAC_PI_4).abs() < EPS);
        assert!(((-a).radians() + FRAC_PI_2).abs() < EPS);
        assert!((a.rotate_by(&a.inverse())).radians().abs() < EPS);

        // Composition wraps into (-pi, pi]
        let c = Rotation::from_radians(3.0 * FRAC_PI_4) + Rotation::from_radians(FRAC_PI_2);
        assert!((c.radians() + 3.0 * FRAC_PI_4).abs() < EPS);
    }

    #[test]
    fn test_rotation_range() {
        assert!((Rotation::from_radians(-PI).radians() - PI).abs() < EPS);
        assert!((Rotation::from_radians(PI).radians() - PI).abs() < EPS);
        assert!((Rotation::from_degrees(270.0).degrees() + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_interpolate() {
        let a = Rotation::from_degrees(170.0);
        let b = Rotation::from_degrees(-170.0);

        // Shortest arc passes through 180, not 0
        let mid = a.interpolate(&b, 0.5);
        assert!((mid.radians().abs() - PI).abs() < 1e-9);

        let quarter = Rotation::identity().interpolate(&Rotation::from_radians(1.0), 0.25);
        assert!((quarter.radians() - 0.25).abs() < EPS);
    }

    #[test]
    fn test_pose_serde() {
        let pose = Pose::from_xy_heading(1.0, -2.0, FRAC_PI_2);

        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose = serde_json::from_str(&json).unwrap();

        assert_eq!(back.translation, pose.translation);
        assert!((back.heading_rad() - FRAC_PI_2).abs() < EPS);
    }
}
