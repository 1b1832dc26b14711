//! Drive task: ramp limiting, dead zone, layouts and faults.

use super::{PERIOD, Stepper, base_config, rig, shared_for};
use robit_common::config::RobotConfig;
use robit_common::control::config::{AutonomousScript, DriveLayout};
use robit_common::control::error::TaskFault;
use robit_common::control::state::RobotMode;
use robit_control::clock::SimClock;
use robit_control::tasks::DriveTask;

const EPS: f64 = 1e-9;

fn mecanum_config() -> RobotConfig {
    let mut config = base_config();
    config.drive.layout = DriveLayout::Mecanum;
    config.io.drive_motor_ports = vec![1, 2, 3, 4];
    config
}

#[test]
fn tank_ramps_at_configured_acceleration() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let axes = config.io.axes;
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    // Full forward; the stick reports forward as negative.
    probe.set_axis(axes.tank_left, -1.0);
    probe.set_axis(axes.tank_right, -1.0);

    let max_step = config.drive.accel_limit * PERIOD.as_secs_f64();
    let mut previous = 0.0;
    let mut samples = Vec::new();
    for _ in 0..10 {
        stepper.run(&mut task, 1);
        let outputs = probe.drive_outputs();
        assert!((outputs[0] - outputs[1]).abs() < EPS);
        assert!(outputs[0] - previous <= max_step + EPS);
        previous = outputs[0];
        samples.push(outputs[0]);
    }

    assert!(samples.windows(2).all(|w| w[1] >= w[0]));
    assert!(samples[1] > 0.0 && samples[1] < 1.0);
    assert!((samples[9] - 1.0).abs() < EPS);
    assert_eq!(shared.drive.read().outputs.as_slice(), probe.drive_outputs().as_slice());
}

#[test]
fn stick_inside_dead_zone_holds_zero() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let axes = config.io.axes;
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_axis(axes.tank_left, -0.05);
    probe.set_axis(axes.tank_right, 0.09);
    stepper.run(&mut task, 20);
    assert_eq!(probe.drive_outputs(), vec![0.0, 0.0]);
}

#[test]
fn tank_turn_reduces_both_sides() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let axes = config.io.axes;
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_axis(axes.tank_left, -1.0);
    probe.set_axis(axes.tank_right, 1.0);
    stepper.run(&mut task, 20);

    // turn = |1 - (-1)| / 4 = 0.5
    let outputs = probe.drive_outputs();
    assert!((outputs[0] - 0.5).abs() < EPS);
    assert!((outputs[1] + 0.5).abs() < EPS);
}

#[test]
fn mecanum_mixes_four_wheels() {
    let config = mecanum_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let axes = config.io.axes;
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_axis(axes.strafe, 1.0);
    stepper.run(&mut task, 20);

    let outputs = probe.drive_outputs();
    let expected = [1.0, -1.0, -1.0, 1.0];
    for (out, want) in outputs.iter().zip(expected) {
        assert!((out - want).abs() < EPS, "got {outputs:?}");
    }
    assert_eq!(shared.drive.read().outputs.len(), 4);
}

#[test]
fn disconnected_joystick_ramps_to_zero() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let axes = config.io.axes;
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_axis(axes.tank_left, -1.0);
    probe.set_axis(axes.tank_right, -1.0);
    stepper.run(&mut task, 10);
    assert!(probe.drive_outputs()[0] > 0.9);

    probe.set_joystick_connected(false);
    let outcome = stepper.run(&mut task, 1);
    assert_eq!(outcome.error, None);
    assert!(outcome.faults.contains(TaskFault::SENSOR_UNAVAILABLE));
    // Still ramp limited on the way down.
    assert!(probe.drive_outputs()[0] > 0.0);

    stepper.run(&mut task, 10);
    assert_eq!(probe.drive_outputs(), vec![0.0, 0.0]);
}

#[test]
fn rejected_command_forces_neutral_then_recovers() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let axes = config.io.axes;
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_axis(axes.tank_left, -1.0);
    probe.set_axis(axes.tank_right, -1.0);
    stepper.run(&mut task, 5);

    probe.reject_motor_commands(config.io.drive_motor_ports[0], 1);
    let outcome = stepper.run(&mut task, 1);
    assert!(outcome.faults.contains(TaskFault::ACTUATOR_REJECTED));
    assert_eq!(probe.drive_outputs(), vec![0.0, 0.0]);

    let outcome = stepper.run(&mut task, 10);
    assert!(outcome.faults.is_empty());
    assert!(probe.drive_outputs()[0] > 0.9);
}

#[test]
fn autonomous_drive_then_fire() {
    let mut config = base_config();
    let script = AutonomousScript::DriveThenFire {
        power: 0.5,
        duration_ms: 500,
    };
    config.autonomous.script = script;
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut task = DriveTask::new(&mut hw.drive, &config.drive, config.io.axes, script);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Autonomous);
    assert_eq!(shared.fire.pending(), 0);

    stepper.run(&mut task, 40);
    assert!((probe.drive_outputs()[0] - 0.5).abs() < EPS);
    assert_eq!(shared.fire.pending(), 0);

    stepper.run(&mut task, 20);
    assert_eq!(probe.drive_outputs(), vec![0.0, 0.0]);
    assert_eq!(shared.fire.pending(), 1);

    // One request per autonomous period.
    stepper.run(&mut task, 20);
    assert_eq!(shared.fire.pending(), 1);
}
