//! # Trajectory module
//!
//! A trajectory is the time-parameterised sequence of reference states the
//! controller tracks. Trajectories are generated offline and loaded here,
//! either directly from a `Vec<TrajectoryState>` or from the generator's CSV
//! output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// Internal
use crate::geom::{Pose, Translation};
use util::maths::lerp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single reference state on a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Reference pose. The heading is the direction of travel.
    pub pose: Pose,

    /// Speed along the direction of travel.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Acceleration along the direction of travel.
    ///
    /// Units: meters/second^2
    pub accel_mss: f64,
}

/// A non-empty sequence of trajectory states in time order.
#[derive(Debug, Clone)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
}

/// One row of the generator's trajectory CSV. The `position` and `jerk`
/// columns are not used.
#[derive(Debug, Deserialize)]
struct CsvRow {
    dt: f64,
    x: f64,
    y: f64,
    velocity: f64,
    acceleration: f64,
    heading: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("A trajectory must contain at least one state")]
    Empty,

    #[error("The state at index {index} has a non-finite time")]
    NonFiniteTime { index: usize },

    #[error("The state at index {index} is earlier than the state before it")]
    NonMonotonicTime { index: usize },

    #[error("Could not open the trajectory file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse the trajectory CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    pub fn new(time_s: f64, pose: Pose, velocity_ms: f64, accel_mss: f64) -> Self {
        Self {
            time_s,
            pose,
            velocity_ms,
            accel_mss,
        }
    }

    /// Interpolate between this state and `other`.
    ///
    /// `t = 0` gives `self` and `t = 1` gives `other`. The heading follows
    /// the shortest arc.
    pub fn interpolate(&self, other: &TrajectoryState, t: f64) -> TrajectoryState {
        TrajectoryState {
            time_s: lerp(self.time_s, other.time_s, t),
            pose: Pose::new(
                Translation::new(
                    lerp(self.pose.x_m(), other.pose.x_m(), t),
                    lerp(self.pose.y_m(), other.pose.y_m(), t),
                ),
                self.pose.rotation.interpolate(&other.pose.rotation, t),
            ),
            velocity_ms: lerp(self.velocity_ms, other.velocity_ms, t),
            accel_mss: lerp(self.accel_mss, other.accel_mss, t),
        }
    }
}

impl Trajectory {
    /// Create a new trajectory.
    ///
    /// Timestamps must be finite and must not decrease, repeated timestamps
    /// are allowed.
    pub fn new(states: Vec<TrajectoryState>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty);
        }

        if let Some(index) = states.iter().position(|s| !s.time_s.is_finite()) {
            return Err(TrajectoryError::NonFiniteTime { index });
        }

        for (i, pair) in states.windows(2).enumerate() {
            if pair[1].time_s < pair[0].time_s {
                return Err(TrajectoryError::NonMonotonicTime { index: i + 1 });
            }
        }

        Ok(Self { states })
    }

    /// Load a trajectory from a CSV file produced by the trajectory
    /// generator.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let file = File::open(path.as_ref())?;
        let traj = Self::from_csv_reader(file)?;

        debug!(
            "Loaded {} trajectory states ({:.3} s) from {:?}",
            traj.len(),
            traj.total_time_s(),
            path.as_ref()
        );

        Ok(traj)
    }

    /// Load a trajectory from CSV data.
    ///
    /// The data must have a header row naming the columns `dt, x, y,
    /// position, velocity, acceleration, jerk, heading`. Each row's time is
    /// the sum of the `dt` of all preceding rows, so the first state is at
    /// zero. Headings are in radians.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TrajectoryError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut states = Vec::new();
        let mut time_s = 0.0;

        for row in rdr.deserialize() {
            let row: CsvRow = row?;

            states.push(TrajectoryState::new(
                time_s,
                Pose::from_xy_heading(row.x, row.y, row.heading),
                row.velocity,
                row.acceleration,
            ));

            time_s += row.dt;
        }

        Self::new(states)
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false, trajectories can't be empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The pose at the start of the trajectory.
    pub fn initial_pose(&self) -> Pose {
        self.first().pose
    }

    /// The time of the last state.
    ///
    /// Units: seconds
    pub fn total_time_s(&self) -> f64 {
        self.last().time_s
    }

    /// Get the reference state at the given time.
    ///
    /// Times before the first state give the first state and times after the
    /// last give the last. Between states the translation, velocity and
    /// acceleration are linearly interpolated and the heading follows the
    /// shortest arc.
    ///
    /// A NaN time gives a state with NaN pose, velocity and acceleration,
    /// except on a single-state trajectory which always gives that state.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        let first = self.first();
        let last = self.last();

        if time_s <= first.time_s || self.states.len() == 1 {
            return TrajectoryState { time_s, ..*first };
        }
        if time_s >= last.time_s {
            return TrajectoryState { time_s, ..*last };
        }

        // Index of the first state after `time_s`. For a time strictly
        // inside the range this is already in 1..len, the clamp only matters
        // for NaN, which fails every comparison.
        let upper = self
            .states
            .partition_point(|s| s.time_s <= time_s)
            .max(1)
            .min(self.states.len() - 1);
        let s0 = &self.states[upper - 1];
        let s1 = &self.states[upper];

        let span_s = s1.time_s - s0.time_s;
        if span_s <= 0.0 {
            return TrajectoryState { time_s, ..*s1 };
        }

        let mut state = s0.interpolate(s1, (time_s - s0.time_s) / span_s);
        state.time_s = time_s;
        state
    }

    fn first(&self) -> &TrajectoryState {
        &self.states[0]
    }

    fn last(&self) -> &TrajectoryState {
        &self.states[self.states.len() - 1]
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryState;
    type IntoIter = std::slice::Iter<'a, TrajectoryState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn line() -> Trajectory {
        Trajectory::new(vec![
            TrajectoryState::new(0.0, Pose::from_xy_heading(0.0, 0.0, 0.0), 0.0, 1.0),
            TrajectoryState::new(1.0, Pose::from_xy_heading(0.5, 0.0, 0.0), 1.0, 1.0),
            TrajectoryState::new(2.0, Pose::from_xy_heading(1.5, 1.0, FRAC_PI_2), 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_errors() {
        assert!(matches!(Trajectory::new(vec![]), Err(TrajectoryError::Empty)));

        let states = vec![
            TrajectoryState::new(0.0, Pose::default(), 0.0, 0.0),
            TrajectoryState::new(0.5, Pose::default(), 0.0, 0.0),
            TrajectoryState::new(0.5, Pose::default(), 0.0, 0.0),
            TrajectoryState::new(0.4, Pose::default(), 0.0, 0.0),
        ];
        assert!(matches!(
            Trajectory::new(states),
            Err(TrajectoryError::NonMonotonicTime { index: 3 })
        ));
    }

    #[test]
    fn test_new_rejects_non_finite_time() {
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN].iter() {
            let states = vec![
                TrajectoryState::new(0.0, Pose::default(), 0.0, 0.0),
                TrajectoryState::new(*bad, Pose::default(), 0.0, 0.0),
            ];
            assert!(matches!(
                Trajectory::new(states),
                Err(TrajectoryError::NonFiniteTime { index: 1 })
            ));
        }
    }

    #[test]
    fn test_sample_nan_time() {
        let s = line().sample(f64::NAN);
        assert!(s.time_s.is_nan());
        assert!(s.pose.x_m().is_nan());
        assert!(s.velocity_ms.is_nan());

        let single = Trajectory::new(vec![TrajectoryState::new(
            1.0,
            Pose::from_xy_heading(2.0, 3.0, 0.0),
            0.5,
            0.0,
        )])
        .unwrap();
        let s = single.sample(f64::NAN);
        assert!(s.time_s.is_nan());
        assert_eq!(s.pose.x_m(), 2.0);
    }

    #[test]
    fn test_accessors() {
        let traj = line();

        assert_eq!(traj.len(), 3);
        assert!(!traj.is_empty());
        assert_eq!(traj.total_time_s(), 2.0);
        assert_eq!(traj.initial_pose(), Pose::from_xy_heading(0.0, 0.0, 0.0));
        assert_eq!(traj.iter().count(), 3);
    }

    #[test]
    fn test_sample_clamps() {
        let traj = line();

        let before = traj.sample(-1.0);
        assert_eq!(before.pose, traj.states()[0].pose);
        assert_eq!(before.time_s, -1.0);

        let after = traj.sample(10.0);
        assert_eq!(after.pose, traj.states()[2].pose);
        assert_eq!(after.velocity_ms, 1.0);
    }

    #[test]
    fn test_sample_interpolates() {
        let traj = line();

        let s = traj.sample(0.5);
        assert!((s.pose.x_m() - 0.25).abs() < EPS);
        assert!((s.velocity_ms - 0.5).abs() < EPS);
        assert!((s.accel_mss - 1.0).abs() < EPS);

        let s = traj.sample(1.5);
        assert!((s.pose.x_m() - 1.0).abs() < EPS);
        assert!((s.pose.y_m() - 0.5).abs() < EPS);
        assert!((s.pose.heading_rad() - FRAC_PI_2 / 2.0).abs() < EPS);

        // Exact state times give the state itself
        let s = traj.sample(1.0);
        assert!((s.pose.x_m() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_sample_heading_shortest_arc() {
        let traj = Trajectory::new(vec![
            TrajectoryState::new(0.0, Pose::from_xy_heading(0.0, 0.0, PI - 0.1), 0.0, 0.0),
            TrajectoryState::new(1.0, Pose::from_xy_heading(0.0, 0.0, -PI + 0.1), 0.0, 0.0),
        ])
        .unwrap();

        let s = traj.sample(0.5);
        assert!((s.pose.heading_rad().abs() - PI).abs() < EPS);
    }

    #[test]
    fn test_from_csv() {
        let data = "\
dt,x,y,position,velocity,acceleration,jerk,heading
0.02,0.0,0.0,0.0,0.0,5.0,0.0,0.0
0.02,0.001,0.0,0.001,0.1,5.0,0.0,0.0
0.02,0.004,0.001,0.004,0.2,5.0,0.0,0.1
";
        let traj = Trajectory::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(traj.len(), 3);
        assert_eq!(traj.states()[0].time_s, 0.0);
        assert!((traj.states()[1].time_s - 0.02).abs() < EPS);
        assert!((traj.total_time_s() - 0.04).abs() < EPS);

        let last = traj.states()[2];
        assert_eq!(last.pose.x_m(), 0.004);
        assert_eq!(last.pose.y_m(), 0.001);
        assert_eq!(last.velocity_ms, 0.2);
        assert_eq!(last.accel_mss, 5.0);
        assert!((last.pose.heading_rad() - 0.1).abs() < EPS);
    }

    #[test]
    fn test_from_csv_errors() {
        let header_only = "dt,x,y,position,velocity,acceleration,jerk,heading\n";
        assert!(matches!(
            Trajectory::from_csv_reader(header_only.as_bytes()),
            Err(TrajectoryError::Empty)
        ));

        let bad = "dt,x,y,position,velocity,acceleration,jerk,heading\n0.02,a,0,0,0,0,0,0\n";
        assert!(matches!(
            Trajectory::from_csv_reader(bad.as_bytes()),
            Err(TrajectoryError::Csv(_))
        ));

        assert!(matches!(
            Trajectory::from_csv_path("/does/not/exist.csv"),
            Err(TrajectoryError::Io(_))
        ));
    }
}
