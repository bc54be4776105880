//! 阻抗控制周期集成测试

mod common;

use approx::assert_relative_eq;
use armctl_impedance::{
    CartesianImpedanceController, ImpedanceConfig, StiffnessMessage, StiffnessUpdate,
};
use armctl_math::{Matrix3, Vector3, Vector6, Vector7};
use common::{PointMassArm, RecordingSink, panda_joint_names};
use nalgebra::Quaternion;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const DT: f64 = 0.001;

fn config(filter_params: f64) -> ImpedanceConfig {
    let mut config = ImpedanceConfig::new(
        "panda",
        panda_joint_names(),
        vec![200.0, 200.0, 200.0, 10.0, 10.0, 10.0],
    );
    config.filter_params = filter_params;
    config
}

#[test]
fn diagonal_update_derives_critical_damping_after_one_step() {
    let arm = PointMassArm::at(Vector3::new(0.3, 0.0, 0.5));
    let controller = CartesianImpedanceController::new(config(1.0)).unwrap();
    let handle = controller.target_handle();
    let mut controller = controller.start(&arm);

    let gains = [400.0, 300.0, 200.0, 30.0, 20.0, 10.0];
    handle
        .apply_stiffness_message(&StiffnessMessage::diagonal(gains))
        .unwrap();

    let mut sink = RecordingSink::default();
    controller.update(&arm, &mut sink);

    let applied = controller.gains();
    for (i, &k) in gains.iter().enumerate() {
        assert_relative_eq!(applied.stiffness[(i, i)], k, epsilon = 1e-12);
        assert_relative_eq!(applied.damping[(i, i)], 2.0 * k.sqrt(), epsilon = 1e-12);
    }
}

#[test]
fn configured_damping_scale_is_used() {
    let mut cfg = config(1.0);
    cfg.damping_scale = 0.5;
    let arm = PointMassArm::at(Vector3::zeros());
    let controller = CartesianImpedanceController::new(cfg).unwrap();
    let handle = controller.target_handle();
    let mut controller = controller.start(&arm);

    handle
        .set_stiffness(&StiffnessUpdate::Diagonal {
            stiffness: Vector6::repeat(100.0),
            damping: None,
        })
        .unwrap();
    controller.update(&arm, &mut RecordingSink::default());

    assert_relative_eq!(controller.gains().damping[(0, 0)], 5.0, epsilon = 1e-12);
}

#[test]
fn full_coupled_update_is_applied() {
    let arm = PointMassArm::at(Vector3::zeros());
    let controller = CartesianImpedanceController::new(config(1.0)).unwrap();
    let handle = controller.target_handle();
    let mut controller = controller.start(&arm);

    handle
        .set_stiffness(&StiffnessUpdate::Full {
            translational_stiffness: Matrix3::new(100.0, 10.0, 0.0, 10.0, 100.0, 0.0, 0.0, 0.0, 100.0),
            rotational_stiffness: Matrix3::from_diagonal_element(5.0),
            translational_damping: Matrix3::from_diagonal_element(20.0),
            rotational_damping: Matrix3::from_diagonal_element(1.0),
        })
        .unwrap();
    controller.update(&arm, &mut RecordingSink::default());

    let applied = controller.gains();
    assert_relative_eq!(applied.stiffness[(0, 1)], 10.0);
    assert_relative_eq!(applied.stiffness[(3, 3)], 5.0);
    assert_relative_eq!(applied.stiffness[(0, 4)], 0.0);
    assert_relative_eq!(applied.damping[(2, 2)], 20.0);
}

#[test]
fn end_effector_converges_to_new_target() {
    let mut arm = PointMassArm::at(Vector3::new(0.3, 0.0, 0.5));
    let controller = CartesianImpedanceController::new(config(0.005)).unwrap();
    let handle = controller.target_handle();
    let mut controller = controller.start(&arm);
    let mut sink = RecordingSink::default();

    let goal = Vector3::new(0.35, -0.02, 0.48);
    handle
        .set_equilibrium_pose(goal, Quaternion::identity())
        .unwrap();

    for _ in 0..4000 {
        let tau = controller.update(&arm, &mut sink);
        arm.step(&tau, DT);
    }

    assert!((arm.position() - goal).norm() < 1e-3, "final position {:?}", arm.position());

    // 每个周期的力矩变化都不超过 1 Nm
    let mut previous = Vector7::zeros();
    for tau in &sink.history {
        assert!((tau - previous).amax() <= 1.0 + 1e-12);
        previous = *tau;
    }
}

#[test]
fn target_updates_from_another_thread() {
    let mut arm = PointMassArm::at(Vector3::new(0.0, 0.0, 0.4));
    let controller = CartesianImpedanceController::new(config(0.01)).unwrap();
    let handle = controller.target_handle();
    let mut controller = controller.start(&arm);
    let mut sink = RecordingSink::default();

    let done = Arc::new(AtomicBool::new(false));
    let writer = {
        let done = done.clone();
        let handle = handle.clone();
        thread::spawn(move || {
            for i in 0..=100 {
                let x = 0.001 * i as f64;
                handle
                    .set_equilibrium_pose(Vector3::new(x, 0.0, 0.4), Quaternion::identity())
                    .unwrap();
                handle.set_nullspace_stiffness(0.1 * i as f64).unwrap();
                thread::yield_now();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut cycles = 0;
    while !done.load(Ordering::SeqCst) || cycles < 5000 {
        let tau = controller.update(&arm, &mut sink);
        assert!(tau.iter().all(|v| v.is_finite()));
        arm.step(&tau, DT);
        cycles += 1;
    }
    writer.join().unwrap();

    assert_relative_eq!(handle.snapshot().position.x, 0.1);
    assert!((arm.position().x - 0.1).abs() < 1e-3);
}
