//! Commands passed into and out of LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::SwerveModules;
use crate::geom::{Rotation, Translation};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A velocity demand for the whole chassis.
///
/// Whether this is in the robot body or the field frame depends on where it
/// came from: trajectory control produces field-relative velocities, the
/// kinematics consume and produce robot-relative ones. Use
/// [`ChassisVelocity::to_robot_relative`] and
/// [`ChassisVelocity::to_field_relative`] to move between them.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisVelocity {
    /// Forward velocity.
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Leftwards (strafe) velocity.
    ///
    /// Units: meters/second
    pub vy_ms: f64,

    /// Anticlockwise angular rate about the centre of rotation.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// The speed and steer angle of a single swerve module.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleState {
    /// Wheel ground speed. Never negative, the direction of travel is given
    /// by `angle`.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Steer angle of the module relative to the robot's forward direction.
    pub angle: Rotation,
}

/// A module state for every module, in canonical order.
pub type ModuleStateSet = SwerveModules<ModuleState>;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisVelocity {
    pub fn new(vx_ms: f64, vy_ms: f64, omega_rads: f64) -> Self {
        Self {
            vx_ms,
            vy_ms,
            omega_rads,
        }
    }

    /// The linear part of the velocity as a vector.
    pub fn linear(&self) -> Translation {
        Translation::new(self.vx_ms, self.vy_ms)
    }

    /// Convert a field-relative velocity into the robot body frame, given the
    /// robot's heading.
    pub fn to_robot_relative(&self, heading: &Rotation) -> ChassisVelocity {
        let v_rb = self.linear().rotate_by(&heading.inverse());
        ChassisVelocity::new(v_rb.x_m, v_rb.y_m, self.omega_rads)
    }

    /// Convert a robot-relative velocity into the field frame, given the
    /// robot's heading.
    pub fn to_field_relative(&self, heading: &Rotation) -> ChassisVelocity {
        let v = self.linear().rotate_by(heading);
        ChassisVelocity::new(v.x_m, v.y_m, self.omega_rads)
    }
}

impl ModuleState {
    pub fn new(speed_ms: f64, angle: Rotation) -> Self {
        Self { speed_ms, angle }
    }

    /// The module's velocity vector in the robot body frame.
    pub fn velocity_rb(&self) -> Translation {
        Translation::new(self.angle.cos(), self.angle.sin()) * self.speed_ms
    }
}
