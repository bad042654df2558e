//! # Trajectory controllers module
//!
//! This module provides the single-axis feedback controllers used by
//! TrajCtrl.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A feedback controller acting on a single axis.
///
/// The controller owns its setpoint and any accumulated state. TrajCtrl
/// calls `calculate` exactly once per axis per tick.
pub trait AxisController {
    /// Set the value the controller drives the measurement towards.
    fn set_setpoint(&mut self, setpoint: f64);

    /// The current setpoint.
    fn setpoint(&self) -> f64;

    /// Get the controller output for the given measurement at the given time.
    fn calculate(&mut self, measurement: f64, time_s: f64) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Output limits, `(min, max)`
    output_limits: Option<(f64, f64)>,

    /// The value the controller drives the measurement towards
    setpoint: f64,

    /// Time of the previous error
    prev_time_s: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            output_limits: None,
            setpoint: 0f64,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None,
        }
    }

    /// A proportional-only controller.
    pub fn proportional(k_p: f64) -> Self {
        Self::new(k_p, 0.0, 0.0)
    }

    /// Clamp the controller's output to `[min, max]`.
    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_limits = Some((min, max));
        self
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Clear the accumulated integral, previous error and time.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
        self.prev_time_s = None;
    }

    /// Get the value of the controller for the given error at the given time.
    ///
    /// The integral and derivative terms only advance when `time_s` is after
    /// the time of the previous call. On the first call, or if time has not
    /// moved forwards, they contribute no new accumulation.
    pub fn get(&mut self, error: f64, time_s: f64) -> f64 {
        // Calculate dt
        let dt = match self.prev_time_s {
            Some(t0) if time_s > t0 => Some(time_s - t0),
            _ => None,
        };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        // The other option is to add on the error and that will produce a
        // large spike in integral compared to normal operation, so we don't do
        // this.
        if let Some(t) = dt {
            self.integral += error * t;
        }

        // Calculate the derivative, assuming none if there's no time
        // difference for the same reasons as for integral.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64,
        };

        let mut out = self.k_p * error + self.k_i * self.integral + self.k_d * deriv;

        if let Some((min, max)) = self.output_limits {
            out = out.max(min).min(max);
        }

        // Remember the previous error and time, never moving time backwards
        self.prev_error = Some(error);
        self.prev_time_s = Some(match self.prev_time_s {
            Some(t0) if t0 > time_s => t0,
            _ => time_s,
        });

        out
    }
}

impl AxisController for PidController {
    fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// The error is `setpoint - measurement`, so a positive output drives the
    /// measurement upwards.
    fn calculate(&mut self, measurement: f64, time_s: f64) -> f64 {
        self.get(self.setpoint - measurement, time_s)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
