//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::*;
use crate::geom::Pose;
use crate::loco_ctrl::ChassisVelocity;
use crate::trajectory::TrajectoryState;
use util::maths::get_ang_dist;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Feedforward plus feedback controller for a holonomic chassis.
///
/// Each controller owns its axis controllers and diagnostics, so separate
/// control sessions must use separate instances.
#[derive(Debug, Clone)]
pub struct HolonomicController<C: AxisController = PidController> {
    /// Controller acting on the field X position
    x_ctrl: C,

    /// Controller acting on the field Y position
    y_ctrl: C,

    heading_ctrl: HeadingCtrl,

    diagnostics: ControllerDiagnostics,

    report: StatusReport,
}

/// Breakdown of the latest tick's demand.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Time of the reference state used in the tick
    pub time_s: f64,

    /// Feedforward demand along field X
    pub ff_x_ms: f64,

    /// Feedforward demand along field Y
    pub ff_y_ms: f64,

    /// Feedback demand along field X
    pub fb_x_ms: f64,

    /// Feedback demand along field Y
    pub fb_y_ms: f64,

    /// Reference minus current X position
    pub error_x_m: f64,

    /// Reference minus current Y position
    pub error_y_m: f64,

    /// Distance between the reference and current positions
    pub position_error_m: f64,

    /// Shortest angle from the current to the reference heading
    pub heading_error_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HolonomicController<PidController> {
    /// Create a new PID-based controller from parameters.
    pub fn from_params(params: &Params) -> Self {
        Self::new(params.x_controller(), params.y_controller())
            .with_heading_ctrl(params.heading_ctrl)
    }
}

impl<C: AxisController> HolonomicController<C> {
    /// Create a new controller from a pair of axis controllers. The heading
    /// is held.
    pub fn new(x_ctrl: C, y_ctrl: C) -> Self {
        Self {
            x_ctrl,
            y_ctrl,
            heading_ctrl: HeadingCtrl::Hold,
            diagnostics: ControllerDiagnostics::default(),
            report: StatusReport::default(),
        }
    }

    /// Set the heading control mode.
    pub fn with_heading_ctrl(mut self, heading_ctrl: HeadingCtrl) -> Self {
        self.heading_ctrl = heading_ctrl;
        self
    }

    /// Calculate the field-relative chassis velocity which drives
    /// `current_pose` towards `reference`.
    ///
    /// Each axis controller is evaluated exactly once, using the reference
    /// state's time as its time base. Diagnostics are updated after the
    /// demand is formed.
    pub fn calculate(&mut self, current_pose: &Pose, reference: &TrajectoryState) -> ChassisVelocity {
        let ref_pose = &reference.pose;

        // Feedforward
        let ff_x_ms = reference.velocity_ms * ref_pose.rotation.cos();
        let ff_y_ms = reference.velocity_ms * ref_pose.rotation.sin();

        // Feedback
        self.x_ctrl.set_setpoint(ref_pose.x_m());
        self.y_ctrl.set_setpoint(ref_pose.y_m());
        let fb_x_ms = self.x_ctrl.calculate(current_pose.x_m(), reference.time_s);
        let fb_y_ms = self.y_ctrl.calculate(current_pose.y_m(), reference.time_s);

        let heading_error_rad = get_ang_dist(current_pose.heading_rad(), ref_pose.heading_rad());
        let omega_rads = match self.heading_ctrl {
            HeadingCtrl::Hold => 0.0,
            HeadingCtrl::Track { k_p } => k_p * heading_error_rad,
        };

        let dem = ChassisVelocity::new(ff_x_ms + fb_x_ms, ff_y_ms + fb_y_ms, omega_rads);

        self.diagnostics
            .update(&ref_pose.translation, current_pose, fb_x_ms, fb_y_ms);

        self.report = StatusReport {
            time_s: reference.time_s,
            ff_x_ms,
            ff_y_ms,
            fb_x_ms,
            fb_y_ms,
            error_x_m: ref_pose.x_m() - current_pose.x_m(),
            error_y_m: ref_pose.y_m() - current_pose.y_m(),
            position_error_m: ref_pose.translation.distance(&current_pose.translation),
            heading_error_rad,
        };

        trace!("TrajCtrl: {:?}", self.report);

        dem
    }

    /// The worst tracking performance seen so far.
    pub fn diagnostics(&self) -> ControllerDiagnostics {
        self.diagnostics
    }

    /// Forget all recorded maxima.
    pub fn reset_diagnostics(&mut self) {
        self.diagnostics = ControllerDiagnostics::default();
    }

    /// Report from the latest call to `calculate`.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    pub fn x_controller(&self) -> &C {
        &self.x_ctrl
    }

    pub fn y_controller(&self) -> &C {
        &self.y_ctrl
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
