//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::PidController;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// X position controller proportional gain
    pub x_k_p: f64,

    /// X position controller integral gain
    #[serde(default)]
    pub x_k_i: f64,

    /// X position controller derivative gain
    #[serde(default)]
    pub x_k_d: f64,

    /// Y position controller proportional gain
    pub y_k_p: f64,

    /// Y position controller integral gain
    #[serde(default)]
    pub y_k_i: f64,

    /// Y position controller derivative gain
    #[serde(default)]
    pub y_k_d: f64,

    /// Symmetric limit on each axis' feedback demand, if any.
    ///
    /// Units: meters/second
    #[serde(default)]
    pub max_fb_dem_ms: Option<f64>,

    /// Heading control mode
    #[serde(default)]
    pub heading_ctrl: HeadingCtrl,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the controller commands the chassis rotation rate.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "mode")]
pub enum HeadingCtrl {
    /// No rotation rate is ever commanded.
    Hold,

    /// Proportional control of the heading towards the reference heading.
    Track { k_p: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for HeadingCtrl {
    fn default() -> Self {
        HeadingCtrl::Hold
    }
}

impl Params {
    /// Build the X axis controller described by these parameters.
    pub fn x_controller(&self) -> PidController {
        self.limit(PidController::new(self.x_k_p, self.x_k_i, self.x_k_d))
    }

    /// Build the Y axis controller described by these parameters.
    pub fn y_controller(&self) -> PidController {
        self.limit(PidController::new(self.y_k_p, self.y_k_i, self.y_k_d))
    }

    fn limit(&self, pid: PidController) -> PidController {
        match self.max_fb_dem_ms {
            Some(l) => pid.with_output_limits(-l.abs(), l.abs()),
            None => pid,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_minimal_params() {
        let params: Params = util::params::from_str("x_k_p = 10.0\ny_k_p = 10.0\n").unwrap();

        assert_eq!(params.x_k_i, 0.0);
        assert_eq!(params.y_k_d, 0.0);
        assert!(params.max_fb_dem_ms.is_none());
        assert_eq!(params.heading_ctrl, HeadingCtrl::Hold);
    }

    #[test]
    fn test_heading_track() {
        let params: Params = util::params::from_str(
            r#"
            x_k_p = 1.0
            y_k_p = 2.0
            max_fb_dem_ms = 0.5

            [heading_ctrl]
            mode = "Track"
            k_p = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(params.heading_ctrl, HeadingCtrl::Track { k_p: 3.0 });
        assert_eq!(params.max_fb_dem_ms, Some(0.5));
    }
}
