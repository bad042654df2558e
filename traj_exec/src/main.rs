//! Trajectory tracking executable entry point.
//!
//! # Architecture
//!
//! The executable runs the full control stack against a reference trajectory:
//!
//!     - Initialise the session and logging
//!     - Load parameters and the trajectory
//!     - Build kinematics, odometry and the trajectory controller
//!     - Run the closed-loop simulation
//!     - Archive the per-tick records and save the controller diagnostics
//!
//! The trajectory CSV may be given as the only argument, otherwise the one named in
//! `traj_exec.toml` is used.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::env;
use std::path::PathBuf;

// Internal
use traj_lib::{
    geom::{Pose, Translation},
    loc::SwerveOdometry,
    loco_ctrl::{self, SwerveKinematics},
    params::TrajExecParams,
    sim::ClosedLoopSim,
    traj_ctrl::{self, HolonomicController},
    trajectory::Trajectory,
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, Some(session.log_file_path.as_path()))
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: TrajExecParams =
        util::params::load("traj_exec.toml").wrap_err("Could not load exec params")?;
    let loco_params: loco_ctrl::Params =
        util::params::load("loco_ctrl.toml").wrap_err("Could not load LocoCtrl params")?;
    let traj_params: traj_ctrl::Params =
        util::params::load("traj_ctrl.toml").wrap_err("Could not load TrajCtrl params")?;

    info!("Parameters loaded");

    // ---- LOAD TRAJECTORY ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let traj_path = match args.len() {
        2 => PathBuf::from(&args[1]),
        1 => host::get_sw_root()
            .wrap_err("The software root is not set")?
            .join(&exec_params.trajectory_path),
        n => return Err(eyre!("Expected either zero or one argument, found {}", n - 1)),
    };

    info!("Loading trajectory from {:?}", traj_path);

    let trajectory = Trajectory::from_csv_path(&traj_path).wrap_err("Failed to load the trajectory")?;

    info!(
        "Loaded trajectory lasts {:.02} s and contains {} states\n",
        trajectory.total_time_s(),
        trajectory.len()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let kinematics =
        SwerveKinematics::new(loco_params.layout()).wrap_err("Failed to initialise LocoCtrl")?;
    info!("LocoCtrl init complete");

    let start = trajectory.initial_pose();
    let initial_pose = Pose::new(
        start.translation + Translation::new(exec_params.initial_offset_m[0], exec_params.initial_offset_m[1]),
        start.rotation,
    );
    let odometry = SwerveOdometry::new(kinematics.clone(), initial_pose);
    info!("Loc init complete, starting at {:?}", initial_pose);

    let controller = HolonomicController::from_params(&traj_params);
    info!("TrajCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- RUN ----

    let mut sim = ClosedLoopSim::new(
        kinematics,
        odometry,
        controller,
        exec_params.sim_params(loco_params.max_module_speed_ms),
    );

    let output = sim.run(&trajectory);

    // ---- ARCHIVE ----

    let mut archiver =
        Archiver::from_path(&session, "traj_ctrl.csv").wrap_err("Failed to create the archive")?;
    for record in output.records.iter() {
        archiver.serialise(record).wrap_err("Failed to archive a record")?;
    }
    archiver.flush().wrap_err("Failed to flush the archive")?;

    session
        .save_json("diagnostics.json", &output.diagnostics)
        .wrap_err("Failed to save the diagnostics")?;

    // ---- SUMMARY ----

    let diag = &output.diagnostics;
    info!("Simulated {:.02} s in {} ticks", output.total_time_s, output.records.len());
    info!(
        "Max position error: {:.4} m at ({:.3}, {:.3})",
        diag.max_position_error_m,
        diag.pose_at_max_error.x_m(),
        diag.pose_at_max_error.y_m()
    );
    info!(
        "Max feedback demand: x = {:.4} m/s, y = {:.4} m/s",
        diag.max_fb_x_ms, diag.max_fb_y_ms
    );
    info!("Final pose: {:?}", output.final_pose);

    info!("End of execution");

    Ok(())
}
