//! Fire queue through the shooter task.

use super::{Stepper, base_config, rig, shared_for};
use robit_common::control::config::AutonomousScript;
use robit_common::control::state::{RobotMode, ShooterState};
use robit_common::hal::types::PistonCommand;
use robit_control::clock::SimClock;
use robit_control::tasks::ShooterTask;

/// Ticks for one full spin-up, pulse and retract at the default timings.
const SHOT_TICKS: u32 = (2750 + 750 + 250) / 10;

#[test]
fn four_requests_fire_four_shots_in_order() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut task = ShooterTask::new(&mut hw.shooter, &config.shooter, config.io.buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    for _ in 0..4 {
        shared.fire.request_fire();
    }

    stepper.run(&mut task, 1);
    assert_eq!(shared.shooter.read().state, ShooterState::SpinUp);
    assert_eq!(shared.fire.pending(), 3);
    assert_eq!(probe.shooter_piston(), PistonCommand::REST);

    stepper.run(&mut task, 4 * SHOT_TICKS + 10);

    assert_eq!(probe.shots_fired(), 4);
    let status = shared.shooter.read();
    assert_eq!(status.completed, 4);
    assert_eq!(status.pending, 0);
    assert_eq!(status.state, ShooterState::Idle);
    assert_eq!(probe.shooter_piston(), PistonCommand::REST);
    assert_eq!(probe.shooter_motor(), 0.0);
}

#[test]
fn motor_stays_on_between_queued_shots() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut task = ShooterTask::new(&mut hw.shooter, &config.shooter, config.io.buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    shared.fire.request_fire();
    shared.fire.request_fire();

    // Through the first spin-up and pulse, into cooldown.
    stepper.run(&mut task, (2750 + 750) / 10 + 5);
    assert_eq!(shared.shooter.read().state, ShooterState::Cooldown);
    assert_eq!(probe.shooter_motor(), config.shooter.motor_power);

    // Idle cooldown with nothing queued stops the motor.
    stepper.run(&mut task, SHOT_TICKS + 40);
    assert_eq!(probe.shots_fired(), 2);
    assert_eq!(probe.shooter_motor(), 0.0);
}

#[test]
fn manual_override_never_overlaps_queued_shot() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let mut task = ShooterTask::new(&mut hw.shooter, &config.shooter, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.press(buttons.shooter_override);
    probe.press(buttons.shooter_motor);
    stepper.run(&mut task, 3);
    assert_eq!(shared.shooter.read().state, ShooterState::ManualOverride);
    assert_eq!(probe.shooter_motor(), config.shooter.manual_motor_power);

    // A queued request takes the shooter away from the operator.
    shared.fire.request_fire();
    probe.press(buttons.shooter_piston);
    stepper.run(&mut task, 1);
    assert_eq!(shared.shooter.read().state, ShooterState::SpinUp);
    assert_eq!(probe.shooter_piston(), PistonCommand::REST);

    stepper.run(&mut task, SHOT_TICKS);
    assert_eq!(probe.shots_fired(), 1);
}

#[test]
fn autonomous_burst_fires_configured_count() {
    let mut config = base_config();
    config.autonomous.script = AutonomousScript::FireBurst { count: 2 };
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut task = ShooterTask::new(&mut hw.shooter, &config.shooter, config.io.buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Autonomous);
    assert_eq!(shared.fire.pending(), 2);

    stepper.run(&mut task, 3 * SHOT_TICKS);
    assert_eq!(probe.shots_fired(), 2);
    assert_eq!(shared.shooter.read().completed, 2);
}

#[test]
fn rejected_motor_command_is_reported_and_sequence_continues() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut task = ShooterTask::new(&mut hw.shooter, &config.shooter, config.io.buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    stepper.run(&mut task, 1);
    shared.fire.request_fire();
    probe.reject_motor_commands(config.io.shooter_motor_port, 1);

    let outcome = stepper.run(&mut task, 1);
    assert!(outcome.error.is_some());
    assert_eq!(probe.shooter_motor(), 0.0);

    stepper.run(&mut task, SHOT_TICKS + 5);
    assert_eq!(probe.shots_fired(), 1);
}
