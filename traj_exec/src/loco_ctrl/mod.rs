//! # Locomotion control module
//!
//! Locomotion control converts a whole-chassis velocity demand into the
//! speed and steer angle of each of the four swerve modules, and back again
//! for odometry.
//!
//! The module ordering (front-left, front-right, rear-left, rear-right) is
//! fixed by [`ModuleId`] and carried by [`SwerveModules`], so layouts and
//! module state sets can never be indexed in different orders.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod kinematics;
mod modules;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use kinematics::*;
pub use modules::*;
pub use params::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the robot.
pub const NUM_MODULES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a module layout cannot be used to build the kinematics.
#[derive(Debug, thiserror::Error)]
pub enum DegenerateLayoutError {
    #[error("The offset of the {0} module is not finite")]
    NonFiniteOffset(ModuleId),

    #[error("The {0} and {1} modules are at the same position")]
    CoincidentModules(ModuleId, ModuleId),

    #[error("All modules lie on a single line through the centre of rotation")]
    CollinearModules,

    #[error("The layout's kinematics transform is singular (condition {0:e})")]
    SingularTransform(f64),
}
