//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on the reference
//! trajectory. On every tick it is given the robot's current pose and the
//! reference state for that tick, and produces a field-relative chassis
//! velocity demand made of two parts:
//!
//! - a feedforward term, the reference velocity along the reference heading,
//! - a feedback term from a pair of independent controllers acting on the X
//!   and Y position errors.
//!
//! No rotation rate is commanded by default: trajectories are translation
//! only and the heading is held. Heading tracking can be switched on through
//! [`HeadingCtrl`].
//!
//! Alongside the command the controller keeps [`ControllerDiagnostics`], the
//! worst tracking error and largest feedback corrections seen so far.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod diagnostics;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use diagnostics::*;
pub use params::{HeadingCtrl, Params};
pub use state::*;
