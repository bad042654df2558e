//! # Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use traj_lib::{
    geom::{Pose, Translation},
    loc::SwerveOdometry,
    loco_ctrl::{ChassisVelocity, SwerveKinematics, SwerveModules},
    traj_ctrl::{HolonomicController, PidController},
    trajectory::TrajectoryState,
};

fn kinematics_benchmark(c: &mut Criterion) {
    // ---- Build a square module layout ----

    let layout = SwerveModules::new(
        Translation::new(0.3, 0.3),
        Translation::new(0.3, -0.3),
        Translation::new(-0.3, 0.3),
        Translation::new(-0.3, -0.3),
    );

    c.bench_function("SwerveKinematics::new", |b| {
        b.iter(|| SwerveKinematics::new(black_box(layout)).unwrap())
    });

    let mut kin = SwerveKinematics::new(layout).unwrap();
    let vel = ChassisVelocity::new(1.2, -0.4, 0.8);

    c.bench_function("SwerveKinematics::to_module_states", |b| {
        b.iter(|| kin.to_module_states(black_box(&vel)))
    });

    let states = kin.to_module_states(&vel);

    c.bench_function("SwerveKinematics::to_chassis_velocity", |b| {
        b.iter(|| kin.to_chassis_velocity(black_box(&states)))
    });

    // ---- One full control tick ----

    let mut odom = SwerveOdometry::new(kin.clone(), Pose::default());
    let mut ctrl = HolonomicController::new(PidController::proportional(10.0), PidController::proportional(10.0));
    let reference = TrajectoryState::new(0.0, Pose::from_xy_heading(0.1, 0.05, 0.2), 1.0, 0.0);
    let mut time_s = 0.0;

    c.bench_function("control tick", |b| {
        b.iter(|| {
            time_s += 0.02;
            let pose = odom.update(time_s, Pose::default().rotation, &states);
            let dem = ctrl.calculate(&pose, &reference);
            kin.to_module_states(&dem.to_robot_relative(&pose.rotation))
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
