//! # Trajectory library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the trajectory crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planar geometry - translations, rotations and poses
pub mod geom;

/// Localisation module - swerve odometry
pub mod loc;

/// Locomotion control module - converts chassis velocities into swerve module states and back
pub mod loco_ctrl;

/// Executable parameters
pub mod params;

/// Closed-loop simulation of the whole control stack
pub mod sim;

/// Trajectory control module - keeps the robot on the reference trajectory
pub mod traj_ctrl;

/// Reference trajectories and their loading
pub mod trajectory;
