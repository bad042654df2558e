//! # Trajectory Executable Parameters
//!
//! This module provides parameters for the trajectory executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::sim;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TrajExecParams {
    /// Trajectory CSV to run if none is given on the command line, relative to the software root.
    pub trajectory_path: String,

    /// Offset of the robot's starting position from the start of the trajectory.
    ///
    /// Units: meters,
    /// Frame: Field
    #[serde(default)]
    pub initial_offset_m: [f64; 2],

    /// Fixed control period. If not given one tick is run per trajectory state.
    ///
    /// Units: seconds
    #[serde(default)]
    pub control_period_s: Option<f64>,

    /// If true module speeds are limited to LocoCtrl's `max_module_speed_ms`.
    #[serde(default)]
    pub desaturate: bool,
}

impl TrajExecParams {
    /// Simulation parameters for a robot whose modules can reach `max_module_speed_ms`.
    pub fn sim_params(&self, max_module_speed_ms: f64) -> sim::Params {
        sim::Params {
            control_period_s: self.control_period_s,
            desaturate: self.desaturate,
            max_module_speed_ms,
        }
    }
}
