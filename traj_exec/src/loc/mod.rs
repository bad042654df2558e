//! # Localisation module
//!
//! This module provides localisation for the robot in the form of swerve
//! odometry: module states are turned back into a chassis velocity and
//! integrated over time to track the robot's position.
//!
//! Wheel slip makes heading integrated from the modules unreliable, so the
//! heading always comes from an external sensor (gyro) and only the
//! translation is odometric.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};

// Internal
use crate::geom::{Pose, Rotation, Translation};
use crate::loco_ctrl::{DegenerateLayoutError, ModuleLayout, ModuleStateSet, SwerveKinematics};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose estimator for a swerve drive.
#[derive(Debug, Clone)]
pub struct SwerveOdometry {
    kinematics: SwerveKinematics,

    /// The current estimated pose in the field frame.
    pose: Pose,

    /// Time of the latest update, `None` before the first update.
    ///
    /// Units: seconds
    prev_time_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveOdometry {
    /// Create a new odometry starting at `initial_pose`.
    pub fn new(kinematics: SwerveKinematics, initial_pose: Pose) -> Self {
        Self {
            kinematics,
            pose: initial_pose,
            prev_time_s: None,
        }
    }

    /// Create a new odometry directly from a module layout.
    pub fn from_layout(
        layout: ModuleLayout,
        initial_pose: Pose,
    ) -> Result<Self, DegenerateLayoutError> {
        Ok(Self::new(SwerveKinematics::new(layout)?, initial_pose))
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The kinematics used to recover chassis velocities.
    pub fn kinematics(&self) -> &SwerveKinematics {
        &self.kinematics
    }

    /// Move the pose estimate to a known pose.
    ///
    /// The timestamp of the last update is kept, so the next update still
    /// integrates over the time elapsed since then.
    pub fn reset(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Update the pose estimate with a new set of module states.
    ///
    /// The chassis velocity explained by `module_states` is assumed constant
    /// since the previous update. It is rotated into the field frame using
    /// `heading` and integrated over the elapsed time. The returned pose's
    /// rotation is `heading` exactly.
    ///
    /// The first update, and any update whose time does not come after the
    /// latest one, integrates over zero time.
    pub fn update(&mut self, time_s: f64, heading: Rotation, module_states: &ModuleStateSet) -> Pose {
        let dt_s = match self.prev_time_s {
            Some(t0) if time_s > t0 => time_s - t0,
            Some(t0) => {
                if time_s < t0 {
                    warn!(
                        "Odometry update at {:.3} s is before the previous update at {:.3} s, \
                         no motion integrated",
                        time_s, t0
                    );
                }
                0.0
            }
            None => 0.0,
        };

        // Only move the time base forwards
        self.prev_time_s = Some(match self.prev_time_s {
            Some(t0) if t0 > time_s => t0,
            _ => time_s,
        });

        let vel_rb = self.kinematics.to_chassis_velocity(module_states);

        let delta_m = Translation::new(vel_rb.vx_ms * dt_s, vel_rb.vy_ms * dt_s).rotate_by(&heading);

        self.pose = Pose::new(self.pose.translation + delta_m, heading);

        trace!(
            "Odometry: dt = {:.4} s, v_rb = {:?}, pose = {:?}",
            dt_s,
            vel_rb,
            self.pose
        );

        self.pose
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
