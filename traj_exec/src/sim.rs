//! # Closed-loop simulation
//!
//! Runs the controller, kinematics and odometry against a trajectory with
//! ideal actuators: every module achieves exactly the state it was commanded
//! and the gyro reads exactly the commanded rotation.
//!
//! Each tick senses first and then controls, so the odometry at a tick
//! reflects the commands issued on the previous tick:
//!
//!  1. Integrate the simulated gyro with the previous rotation rate.
//!  2. Update odometry with the previous module states.
//!  3. Calculate the field-relative demand and rotate it into the robot
//!     frame.
//!  4. Convert the demand into module states, desaturating if configured.
//!  5. Record the tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use crate::geom::{Pose, Rotation};
use crate::loc::SwerveOdometry;
use crate::loco_ctrl::{desaturate_module_speeds, ModuleStateSet, SwerveKinematics};
use crate::traj_ctrl::{AxisController, ControllerDiagnostics, HolonomicController, PidController};
use crate::trajectory::{Trajectory, TrajectoryState};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most ticks a fixed control period may produce for one run.
pub const MAX_FIXED_PERIOD_TICKS: usize = 10_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulation.
#[derive(Debug, Clone)]
pub struct Params {
    /// If set, the controller runs at this fixed period, sampling the
    /// trajectory between its states. Otherwise one tick is run per
    /// trajectory state.
    ///
    /// Units: seconds
    pub control_period_s: Option<f64>,

    /// If true module speeds are scaled down to `max_module_speed_ms`.
    pub desaturate: bool,

    /// Units: meters/second
    pub max_module_speed_ms: f64,
}

/// A single tick of the simulation.
///
/// Flat so it can be archived as one CSV row.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct SimRecord {
    pub time_s: f64,

    pub traj_x_m: f64,
    pub traj_y_m: f64,
    pub traj_vel_ms: f64,
    pub traj_heading_rad: f64,

    /// Field-relative demand from the controller
    pub hc_vx_ms: f64,
    pub hc_vy_ms: f64,
    pub hc_omega_rads: f64,

    pub odom_x_m: f64,
    pub odom_y_m: f64,
    pub odom_heading_rad: f64,

    /// Odometry minus reference X
    pub x_error_m: f64,

    /// Odometry minus reference Y
    pub y_error_m: f64,

    /// True if the module speeds were desaturated on this tick.
    pub desaturated: bool,
}

/// Result of a simulation run.
#[derive(Debug, Clone)]
pub struct SimOutput {
    pub records: Vec<SimRecord>,

    pub diagnostics: ControllerDiagnostics,

    /// Odometry pose at the last tick
    pub final_pose: Pose,

    /// Time of the last tick
    pub total_time_s: f64,
}

/// Simulation of the full control loop.
pub struct ClosedLoopSim<C: AxisController = PidController> {
    kinematics: SwerveKinematics,
    odometry: SwerveOdometry,
    controller: HolonomicController<C>,
    params: Params,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            control_period_s: None,
            desaturate: false,
            max_module_speed_ms: f64::INFINITY,
        }
    }
}

impl<C: AxisController> ClosedLoopSim<C> {
    pub fn new(
        kinematics: SwerveKinematics,
        odometry: SwerveOdometry,
        controller: HolonomicController<C>,
        params: Params,
    ) -> Self {
        Self {
            kinematics,
            odometry,
            controller,
            params,
        }
    }

    pub fn controller(&self) -> &HolonomicController<C> {
        &self.controller
    }

    pub fn odometry(&self) -> &SwerveOdometry {
        &self.odometry
    }

    /// Run the loop over the whole trajectory.
    ///
    /// The robot starts stationary at the odometry's current pose, with the
    /// gyro reading that pose's heading.
    pub fn run(&mut self, trajectory: &Trajectory) -> SimOutput {
        let refs = self.reference_states(trajectory);

        info!(
            "Simulating {} ticks over {:.3} s of trajectory",
            refs.len(),
            trajectory.total_time_s()
        );

        let mut heading = self.odometry.pose().rotation;
        let mut prev_states = ModuleStateSet::default();
        let mut prev_omega_rads = 0.0;
        let mut prev_time_s: Option<f64> = None;

        let mut records = Vec::with_capacity(refs.len());

        for reference in refs.iter() {
            let time_s = reference.time_s;

            // Gyro
            if let Some(t0) = prev_time_s {
                if time_s > t0 {
                    heading = heading + Rotation::from_radians(prev_omega_rads * (time_s - t0));
                }
            }

            // Odometry
            let pose = self.odometry.update(time_s, heading, &prev_states);

            // Control
            let dem = self.controller.calculate(&pose, reference);
            let dem_rb = dem.to_robot_relative(&heading);

            let mut states = self.kinematics.to_module_states(&dem_rb);
            let desaturated = self.params.desaturate
                && desaturate_module_speeds(&mut states, self.params.max_module_speed_ms);

            if desaturated {
                trace!("Module speeds desaturated at {:.3} s", time_s);
            }

            records.push(SimRecord {
                time_s,
                traj_x_m: reference.pose.x_m(),
                traj_y_m: reference.pose.y_m(),
                traj_vel_ms: reference.velocity_ms,
                traj_heading_rad: reference.pose.heading_rad(),
                hc_vx_ms: dem.vx_ms,
                hc_vy_ms: dem.vy_ms,
                hc_omega_rads: dem.omega_rads,
                odom_x_m: pose.x_m(),
                odom_y_m: pose.y_m(),
                odom_heading_rad: pose.heading_rad(),
                x_error_m: pose.x_m() - reference.pose.x_m(),
                y_error_m: pose.y_m() - reference.pose.y_m(),
                desaturated,
            });

            // The achieved rotation rate may differ from the demand after
            // desaturation
            prev_omega_rads = self.kinematics.to_chassis_velocity(&states).omega_rads;
            prev_states = states;
            prev_time_s = Some(prev_time_s.map_or(time_s, |t0| t0.max(time_s)));
        }

        let diagnostics = self.controller.diagnostics();
        let final_pose = self.odometry.pose();

        debug!("Simulation diagnostics: {:?}", diagnostics);

        SimOutput {
            total_time_s: records.last().map_or(0.0, |r| r.time_s),
            records,
            diagnostics,
            final_pose,
        }
    }

    /// The reference state for every tick.
    fn reference_states(&self, trajectory: &Trajectory) -> Vec<TrajectoryState> {
        match self.params.control_period_s {
            Some(period_s) if period_s > 0.0 => {
                let t0 = trajectory.states()[0].time_s;
                let span_s = trajectory.total_time_s() - t0;

                // Small tolerance so the final state isn't lost to rounding
                let num_periods = (span_s / period_s + 1e-9).floor();

                if !(num_periods < MAX_FIXED_PERIOD_TICKS as f64) {
                    warn!(
                        "A control period of {} s over {:.3} s needs more than {} ticks, \
                         running one tick per trajectory state instead",
                        period_s, span_s, MAX_FIXED_PERIOD_TICKS
                    );
                    return trajectory.states().to_vec();
                }

                (0..num_periods as usize + 1)
                    .map(|i| trajectory.sample(t0 + i as f64 * period_s))
                    .collect()
            }
            _ => trajectory.states().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
