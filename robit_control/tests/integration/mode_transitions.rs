//! Mode entry: neutral outputs, dropped requests and operator input gating.

use super::{PERIOD, Stepper, base_config, rig, shared_for};
use robit_common::control::config::AutonomousScript;
use robit_common::control::state::{RobotMode, ShooterState, WinchState};
use robit_control::clock::{Clock, SimClock};
use robit_control::task::{ControlTask, TickContext};
use robit_control::tasks::{DriveTask, InputTask, ShooterTask, WinchTask};

#[test]
fn disabled_forces_every_output_neutral_within_one_tick() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let (axes, buttons) = (config.io.axes, config.io.buttons);
    let polarity = config.io.limit_switch.polarity;

    let mut drive = DriveTask::new(&mut hw.drive, &config.drive, axes, AutonomousScript::Idle);
    let mut winch = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut shooter = ShooterTask::new(&mut hw.shooter, &config.shooter, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_axis(axes.tank_left, -1.0);
    probe.set_axis(axes.tank_right, -1.0);
    probe.press(buttons.winch);
    shared.fire.request_fire();

    // Into the firing pulse.
    for _ in 0..(2750 / 10 + 10) {
        stepper.step(&mut drive);
        stepper.step(&mut winch);
        stepper.step(&mut shooter);
        stepper.advance();
    }
    assert_eq!(shared.shooter.read().state, ShooterState::Firing);
    assert_eq!(shared.winch.read().state, WinchState::Winding);
    assert!(!probe.all_neutral());

    shared.enter_mode(RobotMode::Disabled);
    stepper.step(&mut drive);
    stepper.step(&mut winch);
    stepper.step(&mut shooter);

    assert!(probe.all_neutral());
    assert_eq!(shared.shooter.read().state, ShooterState::Idle);
    assert_eq!(shared.winch.read().state, WinchState::Idle);
    assert_eq!(shared.drive.read().outputs.as_slice(), &[0.0, 0.0]);
}

#[test]
fn mode_change_drops_pending_fire_requests() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut shooter = ShooterTask::new(&mut hw.shooter, &config.shooter, config.io.buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    assert!(shared.enter_mode(RobotMode::Teleop));
    for _ in 0..3 {
        shared.fire.request_fire();
    }
    stepper.run(&mut shooter, 10);
    assert_eq!(shared.shooter.read().state, ShooterState::SpinUp);
    assert_eq!(shared.fire.pending(), 2);

    // Re-entering the active mode is ignored.
    assert!(!shared.enter_mode(RobotMode::Teleop));
    assert_eq!(shared.fire.pending(), 2);

    assert!(shared.enter_mode(RobotMode::Test));
    assert_eq!(shared.fire.pending(), 0);
    stepper.run(&mut shooter, 1);
    assert_eq!(shared.shooter.read().state, ShooterState::Idle);
    assert_eq!(probe.shooter_motor(), 0.0);

    stepper.run(&mut shooter, 500);
    assert_eq!(probe.shots_fired(), 0);
}

#[test]
fn operator_input_gated_by_mode() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let mut input = InputTask::new(
        hw.display.as_mut(),
        buttons,
        &config.shooter,
        &config.winch,
    );
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    // Disabled: presses are ignored.
    stepper.run(&mut input, 1);
    probe.press(buttons.fire);
    stepper.run(&mut input, 2);
    assert_eq!(shared.fire.pending(), 0);
    probe.release(buttons.fire);

    // Three presses inside one debounce window queue a single request.
    shared.enter_mode(RobotMode::Teleop);
    stepper.run(&mut input, 1);
    for _ in 0..3 {
        probe.press(buttons.fire);
        stepper.run(&mut input, 1);
        probe.release(buttons.fire);
        stepper.run(&mut input, 1);
    }
    assert_eq!(shared.fire.pending(), 1);

    // Past the window a new press counts.
    stepper.run(&mut input, 30);
    probe.press(buttons.fire);
    stepper.run(&mut input, 1);
    assert_eq!(shared.fire.pending(), 2);
}

#[test]
fn trigger_held_across_mode_change_is_not_a_press() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let mut input = InputTask::new(
        hw.display.as_mut(),
        buttons,
        &config.shooter,
        &config.winch,
    );
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    stepper.run(&mut input, 1);
    probe.press(buttons.fire);
    stepper.run(&mut input, 50);
    assert_eq!(shared.fire.pending(), 1);

    assert!(shared.enter_mode(RobotMode::Test));
    assert_eq!(shared.fire.pending(), 0);
    stepper.run(&mut input, 20);
    assert_eq!(shared.fire.pending(), 0);

    // Releasing and pressing again in the new mode is a press.
    probe.release(buttons.fire);
    stepper.run(&mut input, 1);
    probe.press(buttons.fire);
    stepper.run(&mut input, 1);
    assert_eq!(shared.fire.pending(), 1);
}

#[test]
fn press_from_tick_started_before_mode_change_is_dropped() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let mut input = InputTask::new(
        hw.display.as_mut(),
        buttons,
        &config.shooter,
        &config.winch,
    );

    shared.enter_mode(RobotMode::Teleop);
    let teleop = shared.mode.snapshot();
    let ctx = TickContext::new(teleop, clock.now(), PERIOD, &shared, &hw.sensors, &clock);

    // The transition lands while the Teleop tick is still running.
    assert!(shared.enter_mode(RobotMode::Disabled));
    probe.press(buttons.fire);
    input.tick(&ctx).unwrap();

    assert_eq!(shared.fire.pending(), 0);
}

#[test]
fn setpoint_steps_within_bounds() {
    let mut config = base_config();
    config.winch.setpoint_max = 2.7;
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let mut input = InputTask::new(
        hw.display.as_mut(),
        buttons,
        &config.shooter,
        &config.winch,
    );
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    for _ in 0..5 {
        probe.press(buttons.setpoint_up);
        stepper.run(&mut input, 1);
        probe.release(buttons.setpoint_up);
        stepper.run(&mut input, 1);
    }
    assert!((shared.setpoint.get() - 2.7).abs() < 1e-9);

    probe.press(buttons.setpoint_down);
    stepper.run(&mut input, 1);
    assert!((shared.setpoint.get() - 2.6).abs() < 1e-9);
}

#[test]
fn status_display_follows_mode() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let mut input = InputTask::new(
        hw.display.as_mut(),
        config.io.buttons,
        &config.shooter,
        &config.winch,
    );
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    stepper.run(&mut input, 1);
    assert!(probe.display_lines()[0].starts_with("MODE DISABLED"));

    shared.enter_mode(RobotMode::Autonomous);
    stepper.run(&mut input, 1);
    assert_eq!(probe.display_lines()[0], "MODE AUTO #1");
    assert!(probe.display_flushes() >= 2);
}
