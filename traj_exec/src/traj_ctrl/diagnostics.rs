//! Worst-case tracking diagnostics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::geom::{Pose, Translation};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The worst tracking performance seen by a controller.
///
/// Every field is a maximum-so-far which is only replaced by a strictly
/// greater value, so on ties the first occurrence is kept. The three maxima
/// are tracked independently and need not come from the same tick.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct ControllerDiagnostics {
    /// Largest distance between the reference and current positions.
    ///
    /// Units: meters
    pub max_position_error_m: f64,

    /// The current pose at the tick `max_position_error_m` was recorded.
    pub pose_at_max_error: Pose,

    /// The X feedback demand with the largest magnitude, sign kept.
    ///
    /// Units: meters/second
    pub max_fb_x_ms: f64,

    /// The Y feedback demand with the largest magnitude, sign kept.
    ///
    /// Units: meters/second
    pub max_fb_y_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControllerDiagnostics {
    /// Fold one tick into the diagnostics.
    pub fn update(
        &mut self,
        reference: &Translation,
        current_pose: &Pose,
        fb_x_ms: f64,
        fb_y_ms: f64,
    ) {
        let error_m = reference.distance(&current_pose.translation);
        if error_m > self.max_position_error_m {
            self.max_position_error_m = error_m;
            self.pose_at_max_error = *current_pose;
        }

        if fb_x_ms.abs() > self.max_fb_x_ms.abs() {
            self.max_fb_x_ms = fb_x_ms;
        }

        if fb_y_ms.abs() > self.max_fb_y_ms.abs() {
            self.max_fb_y_ms = fb_y_ms;
        }
    }
}
