//! Swerve drive kinematics
//!
//! Each module's velocity is the chassis linear velocity plus the tangential
//! velocity caused by the chassis rotating about the centre of rotation:
//!
//! ```text
//! v_i = (vx - omega * y_i, vy + omega * x_i)
//! ```
//!
//! Stacking this for all modules gives an 8x3 matrix mapping the chassis
//! velocity onto the module velocities. Going the other way (module states
//! back to a chassis velocity) uses the pseudo-inverse of that matrix, i.e.
//! the least-squares chassis velocity best explaining the module states.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::{DMatrix, DVector};

// Internal
use super::{
    ChassisVelocity, DegenerateLayoutError, ModuleId, ModuleState, ModuleStateSet,
    SwerveModules, NUM_MODULES,
};
use crate::geom::{Rotation, Translation};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Module speeds below this are treated as stationary, and the module keeps
/// its previous steer angle.
///
/// Units: meters/second
pub const MIN_MODULE_SPEED_MS: f64 = 1e-9;

/// Offsets closer than this are considered to be in the same place.
///
/// Units: meters
const LAYOUT_EPSILON_M: f64 = 1e-6;

/// Smallest acceptable ratio between the smallest and largest singular
/// values of the inverse kinematics matrix.
const MIN_CONDITION_RATIO: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position of each module's contact point relative to the robot's
/// centre of rotation, in the robot body frame.
pub type ModuleLayout = SwerveModules<Translation>;

/// Bidirectional kinematics for a four module swerve drive.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    layout: ModuleLayout,

    /// Maps a chassis velocity `[vx, vy, omega]` onto the stacked module
    /// velocities `[v_fl_x, v_fl_y, v_fr_x, ...]`.
    inv_kin: DMatrix<f64>,

    /// Pseudo-inverse of `inv_kin`.
    fwd_kin: DMatrix<f64>,

    /// The last angle commanded to each module, held while the module is
    /// stationary.
    prev_angles: SwerveModules<Rotation>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveKinematics {
    /// Build the kinematics for the given module layout.
    ///
    /// Fails if the layout cannot uniquely determine a chassis velocity from
    /// module states: non-finite offsets, two modules in the same place, all
    /// modules on one line through the centre of rotation, or a numerically
    /// singular transform.
    pub fn new(layout: ModuleLayout) -> Result<Self, DegenerateLayoutError> {
        validate_layout(&layout)?;

        let mut inv_kin = DMatrix::<f64>::zeros(2 * NUM_MODULES, 3);
        for (id, pos_m_rb) in layout.iter() {
            let row = 2 * id.index();
            inv_kin[(row, 0)] = 1.0;
            inv_kin[(row, 2)] = -pos_m_rb.y_m;
            inv_kin[(row + 1, 1)] = 1.0;
            inv_kin[(row + 1, 2)] = pos_m_rb.x_m;
        }

        // Check the conditioning before inverting
        let svd = inv_kin.clone().svd(true, true);
        let max_sv = svd.singular_values.iter().cloned().fold(0f64, f64::max);
        let min_sv = svd
            .singular_values
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        let condition_ratio = min_sv / max_sv;

        if !(condition_ratio > MIN_CONDITION_RATIO) {
            return Err(DegenerateLayoutError::SingularTransform(condition_ratio));
        }

        let fwd_kin = svd
            .pseudo_inverse(f64::EPSILON)
            .map_err(|_| DegenerateLayoutError::SingularTransform(condition_ratio))?;

        debug!(
            "Swerve kinematics built (singular value ratio {:.3e})",
            condition_ratio
        );

        Ok(Self {
            layout,
            inv_kin,
            fwd_kin,
            prev_angles: SwerveModules::default(),
        })
    }

    /// The module layout these kinematics were built for.
    pub fn layout(&self) -> &ModuleLayout {
        &self.layout
    }

    /// The last angle commanded to each module.
    pub fn previous_angles(&self) -> &SwerveModules<Rotation> {
        &self.prev_angles
    }

    /// Overwrite the remembered module angles, for instance with measured
    /// angles at startup.
    pub fn reset_headings(&mut self, angles: SwerveModules<Rotation>) {
        self.prev_angles = angles;
    }

    /// Calculate the module states required to achieve the given
    /// robot-relative chassis velocity, rotating about the robot's centre.
    ///
    /// A module which needs no velocity reports zero speed at its previous
    /// angle, so that stopping never spins the steering.
    pub fn to_module_states(&mut self, vel: &ChassisVelocity) -> ModuleStateSet {
        self.to_module_states_about(vel, &Translation::default())
    }

    /// Calculate the module states required to achieve the given
    /// robot-relative chassis velocity, rotating about `centre_of_rotation_m_rb`
    /// rather than the robot's centre.
    pub fn to_module_states_about(
        &mut self,
        vel: &ChassisVelocity,
        centre_of_rotation_m_rb: &Translation,
    ) -> ModuleStateSet {
        // Rotating about a point is the same as rotating about the centre
        // with the linear velocity the centre would have
        let vel_centre = ChassisVelocity::new(
            vel.vx_ms + vel.omega_rads * centre_of_rotation_m_rb.y_m,
            vel.vy_ms - vel.omega_rads * centre_of_rotation_m_rb.x_m,
            vel.omega_rads,
        );

        let prev_angles = self.prev_angles;

        let states = self.module_velocities(&vel_centre).map(|id, v_ms_rb| {
            let speed_ms = v_ms_rb.norm();

            if speed_ms < MIN_MODULE_SPEED_MS {
                return ModuleState::new(0.0, prev_angles[id]);
            }

            match v_ms_rb.angle() {
                Some(angle) => ModuleState::new(speed_ms, angle),
                None => ModuleState::new(0.0, prev_angles[id]),
            }
        });

        self.prev_angles = states.map(|_, s| s.angle);

        trace!("{:?} -> {:?}", vel, states);

        states
    }

    /// Calculate the robot-relative chassis velocity which best explains the
    /// given module states (least squares).
    pub fn to_chassis_velocity(&self, states: &ModuleStateSet) -> ChassisVelocity {
        let mut module_vels = DVector::<f64>::zeros(2 * NUM_MODULES);

        for (id, state) in states.iter() {
            let v_ms_rb = state.velocity_rb();
            module_vels[2 * id.index()] = v_ms_rb.x_m;
            module_vels[2 * id.index() + 1] = v_ms_rb.y_m;
        }

        let chassis = &self.fwd_kin * module_vels;

        ChassisVelocity::new(chassis[0], chassis[1], chassis[2])
    }

    /// Module velocity vectors for a chassis velocity about the centre,
    /// before any stationary-module handling.
    fn module_velocities(&self, vel: &ChassisVelocity) -> SwerveModules<Translation> {
        let v = &self.inv_kin * DVector::from_column_slice(&[vel.vx_ms, vel.vy_ms, vel.omega_rads]);

        SwerveModules::from_array(ModuleId::ALL).map(|_, id| {
            let row = 2 * id.index();
            Translation::new(v[row], v[row + 1])
        })
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Scale all module speeds down proportionally so that none exceeds
/// `max_speed_ms`.
///
/// Angles are unchanged, so the ratio between module speeds (and therefore
/// the direction of motion) is kept. Returns `true` if the speeds were
/// scaled.
pub fn desaturate_module_speeds(states: &mut ModuleStateSet, max_speed_ms: f64) -> bool {
    let peak_ms = states.iter().map(|(_, s)| s.speed_ms).fold(0f64, f64::max);

    if peak_ms <= max_speed_ms || max_speed_ms <= 0.0 {
        return false;
    }

    let scale = max_speed_ms / peak_ms;
    for id in ModuleId::ALL.iter() {
        states[*id].speed_ms *= scale;
    }

    true
}

/// Check the layout can be used to build the kinematics.
fn validate_layout(layout: &ModuleLayout) -> Result<(), DegenerateLayoutError> {
    for (id, pos_m_rb) in layout.iter() {
        if !pos_m_rb.x_m.is_finite() || !pos_m_rb.y_m.is_finite() {
            return Err(DegenerateLayoutError::NonFiniteOffset(id));
        }
    }

    for (i, &a) in ModuleId::ALL.iter().enumerate() {
        for &b in ModuleId::ALL.iter().skip(i + 1) {
            if layout[a].distance(&layout[b]) < LAYOUT_EPSILON_M {
                return Err(DegenerateLayoutError::CoincidentModules(a, b));
            }
        }
    }

    // All offsets on one line through the origin if every pair's cross
    // product vanishes
    let collinear = ModuleId::ALL.iter().enumerate().all(|(i, &a)| {
        ModuleId::ALL.iter().skip(i + 1).all(|&b| {
            let cross = layout[a].x_m * layout[b].y_m - layout[a].y_m * layout[b].x_m;
            cross.abs() < LAYOUT_EPSILON_M * LAYOUT_EPSILON_M
        })
    });

    if collinear {
        return Err(DegenerateLayoutError::CollinearModules);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const EPS: f64 = 1e-9;

    fn square_layout() -> ModuleLayout {
        SwerveModules::new(
            Translation::new(0.3, 0.3),
            Translation::new(0.3, -0.3),
            Translation::new(-0.3, 0.3),
            Translation::new(-0.3, -0.3),
        )
    }

    fn offset_layout() -> ModuleLayout {
        SwerveModules::new(
            Translation::new(0.45, 0.25),
            Translation::new(0.40, -0.30),
            Translation::new(-0.20, 0.35),
            Translation::new(-0.25, -0.20),
        )
    }

    fn assert_vel_close(a: &ChassisVelocity, b: &ChassisVelocity) {
        assert!(
            (a.vx_ms - b.vx_ms).abs() < EPS
                && (a.vy_ms - b.vy_ms).abs() < EPS
                && (a.omega_rads - b.omega_rads).abs() < EPS,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_pure_translation() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();

        let states = kin.to_module_states(&ChassisVelocity::new(1.0, 0.0, 0.0));

        for (_, s) in states.iter() {
            assert!((s.speed_ms - 1.0).abs() < EPS);
            assert!(s.angle.radians().abs() < EPS);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();

        let states = kin.to_module_states(&ChassisVelocity::new(0.0, 0.0, 1.0));
        let expected_speed = 0.3f64.hypot(0.3);

        for (_, s) in states.iter() {
            assert!((s.speed_ms - expected_speed).abs() < EPS);
        }

        // Perpendicular to each offset, anticlockwise
        assert!((states.fl.angle.radians() - 3.0 * FRAC_PI_4).abs() < EPS);
        assert!((states.fr.angle.radians() - FRAC_PI_4).abs() < EPS);
        assert!((states.rl.angle.radians() + 3.0 * FRAC_PI_4).abs() < EPS);
        assert!((states.rr.angle.radians() + FRAC_PI_4).abs() < EPS);

        // Opposite corners point in opposite directions
        let fl_rr = (states.fl.angle - states.rr.angle).radians();
        let fr_rl = (states.fr.angle - states.rl.angle).radians();
        assert!((fl_rr.abs() - PI).abs() < EPS);
        assert!((fr_rl.abs() - PI).abs() < EPS);
    }

    #[test]
    fn test_speeds_never_negative() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();

        let states = kin.to_module_states(&ChassisVelocity::new(-1.0, 0.0, 0.0));

        for (_, s) in states.iter() {
            assert!((s.speed_ms - 1.0).abs() < EPS);
            assert!((s.angle.radians() - PI).abs() < EPS);
        }
    }

    #[test]
    fn test_round_trip() {
        let vels = [
            ChassisVelocity::new(1.0, 0.0, 0.0),
            ChassisVelocity::new(0.0, -2.0, 0.0),
            ChassisVelocity::new(0.0, 0.0, 3.0),
            ChassisVelocity::new(1.5, 0.5, -1.2),
            ChassisVelocity::new(-3.0, 2.5, 4.0),
            ChassisVelocity::new(0.01, -0.02, 0.005),
        ];

        for layout in [square_layout(), offset_layout()].iter() {
            let mut kin = SwerveKinematics::new(*layout).unwrap();

            for v in vels.iter() {
                let states = kin.to_module_states(v);
                assert_vel_close(&kin.to_chassis_velocity(&states), v);
            }
        }
    }

    #[test]
    fn test_forward_kinematics_from_measured_states() {
        let kin = SwerveKinematics::new(square_layout()).unwrap();

        // All modules pointing left at 2 m/s
        let states = ModuleStateSet::splat(ModuleState::new(2.0, Rotation::from_radians(FRAC_PI_2)));

        assert_vel_close(
            &kin.to_chassis_velocity(&states),
            &ChassisVelocity::new(0.0, 2.0, 0.0),
        );
    }

    #[test]
    fn test_zero_velocity_keeps_angles() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();

        let moving = kin.to_module_states(&ChassisVelocity::new(0.5, 0.5, 1.0));
        let stopped = kin.to_module_states(&ChassisVelocity::default());

        for id in ModuleId::ALL.iter() {
            assert_eq!(stopped[*id].speed_ms, 0.0);
            assert_eq!(stopped[*id].angle, moving[*id].angle);
        }

        // And again, angles stay put while stationary
        let still_stopped = kin.to_module_states(&ChassisVelocity::default());
        assert_eq!(still_stopped, stopped);
    }

    #[test]
    fn test_rotation_about_module() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();

        kin.to_module_states(&ChassisVelocity::new(0.0, 1.0, 0.0));
        let states = kin.to_module_states_about(
            &ChassisVelocity::new(0.0, 0.0, 1.0),
            &Translation::new(0.3, 0.3),
        );

        // The pivot module doesn't move and holds its old angle
        assert_eq!(states.fl.speed_ms, 0.0);
        assert!((states.fl.angle.radians() - FRAC_PI_2).abs() < EPS);

        // The diagonally opposite module is furthest away
        assert!((states.rr.speed_ms - 0.6f64.hypot(0.6)).abs() < EPS);
        assert!((states.fr.speed_ms - 0.6).abs() < EPS);
        assert!((states.fr.angle.radians()).abs() < EPS);
    }

    #[test]
    fn test_module_velocities() {
        let kin = SwerveKinematics::new(square_layout()).unwrap();

        let v = kin.module_velocities(&ChassisVelocity::new(0.0, 0.0, 1.0));
        assert!((v.fl.x_m + 0.3).abs() < EPS);
        assert!((v.fl.y_m - 0.3).abs() < EPS);
        assert!((v.rr.x_m - 0.3).abs() < EPS);
        assert!((v.rr.y_m + 0.3).abs() < EPS);
    }

    #[test]
    fn test_reset_headings() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();
        assert_eq!(*kin.previous_angles(), SwerveModules::default());

        let measured = SwerveModules::new(
            Rotation::from_radians(0.1),
            Rotation::from_radians(-0.2),
            Rotation::from_radians(1.0),
            Rotation::from_radians(-3.0),
        );
        kin.reset_headings(measured);
        assert_eq!(*kin.previous_angles(), measured);

        // A stationary command reports the seeded angles
        let stopped = kin.to_module_states(&ChassisVelocity::default());
        for id in ModuleId::ALL.iter() {
            assert_eq!(stopped[*id].speed_ms, 0.0);
            assert_eq!(stopped[*id].angle, measured[*id]);
        }

        // Moving overwrites them
        kin.to_module_states(&ChassisVelocity::new(1.0, 0.0, 0.0));
        for (_, a) in kin.previous_angles().iter() {
            assert!(a.radians().abs() < EPS);
        }
    }

    #[test]
    fn test_degenerate_layouts() {
        assert!(matches!(
            SwerveKinematics::new(SwerveModules::splat(Translation::default())),
            Err(DegenerateLayoutError::CoincidentModules(
                ModuleId::FrontLeft,
                ModuleId::FrontRight
            ))
        ));

        let mut layout = square_layout();
        layout.rr = layout.fr;
        assert!(matches!(
            SwerveKinematics::new(layout),
            Err(DegenerateLayoutError::CoincidentModules(
                ModuleId::FrontRight,
                ModuleId::RearRight
            ))
        ));

        let collinear = SwerveModules::new(
            Translation::new(0.6, 0.3),
            Translation::new(0.2, 0.1),
            Translation::new(-0.2, -0.1),
            Translation::new(-0.6, -0.3),
        );
        assert!(matches!(
            SwerveKinematics::new(collinear),
            Err(DegenerateLayoutError::CollinearModules)
        ));

        let mut layout = square_layout();
        layout.rl.x_m = f64::NAN;
        assert!(matches!(
            SwerveKinematics::new(layout),
            Err(DegenerateLayoutError::NonFiniteOffset(ModuleId::RearLeft))
        ));
    }

    #[test]
    fn test_desaturate() {
        let mut kin = SwerveKinematics::new(square_layout()).unwrap();

        let mut states = kin.to_module_states(&ChassisVelocity::new(3.0, 0.0, 5.0));
        let before = states;
        let before_peak = before.iter().map(|(_, s)| s.speed_ms).fold(0f64, f64::max);

        assert!(desaturate_module_speeds(&mut states, 2.0));

        let peak = states.iter().map(|(_, s)| s.speed_ms).fold(0f64, f64::max);
        assert!((peak - 2.0).abs() < EPS);

        for id in ModuleId::ALL.iter() {
            assert_eq!(states[*id].angle, before[*id].angle);
            let ratio = states[*id].speed_ms / before[*id].speed_ms;
            assert!((ratio - 2.0 / before_peak).abs() < EPS);
        }

        // Already within limits
        let mut slow = kin.to_module_states(&ChassisVelocity::new(1.0, 0.0, 0.0));
        assert!(!desaturate_module_speeds(&mut slow, 2.0));
        assert!((slow.fl.speed_ms - 1.0).abs() < EPS);
    }
}
