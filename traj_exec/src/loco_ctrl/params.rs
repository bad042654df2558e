//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{ModuleLayout, SwerveModules, NUM_MODULES};
use crate::geom::Translation;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The position of each module's contact point relative to the robot's
    /// centre of rotation, in FL, FR, RL, RR order.
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub module_pos_m_rb: [[f64; 2]; NUM_MODULES],

    // ---- CAPABILITIES ----
    /// Maximum speed a module can be commanded to.
    ///
    /// This is informational, the kinematics never limit module speeds by
    /// themselves.
    ///
    /// Units: meters/second
    pub max_module_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Get the module layout described by these parameters.
    pub fn layout(&self) -> ModuleLayout {
        SwerveModules::from_array(self.module_pos_m_rb).map(|_, p| Translation::new(p[0], p[1]))
    }
}
