//! Winch task: wind, limit, override, release and timeout.

use super::{PERIOD, Stepper, base_config, rig, shared_for};
use robit_common::config::RobotConfig;
use robit_common::control::config::WinchSensing;
use robit_common::control::error::TaskFault;
use robit_common::control::state::{RobotMode, WinchState};
use robit_common::hal::types::PistonCommand;
use robit_control::clock::{Clock, SimClock};
use robit_control::error::TaskError;
use robit_control::tasks::WinchTask;
use std::time::Duration;

fn threshold_config() -> RobotConfig {
    let mut config = base_config();
    config.winch.sensing = WinchSensing::Threshold;
    config
}

#[test]
fn wind_stops_at_limit_switch() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    stepper.run(&mut task, 1);
    probe.press(buttons.winch);
    stepper.run(&mut task, 5);
    assert_eq!(shared.winch.read().state, WinchState::Winding);
    assert_eq!(probe.winch_motor(), config.winch.wind_power);

    // Active-low switch closes.
    probe.set_limit_raw(false);
    stepper.run(&mut task, 1);
    let status = shared.winch.read();
    assert_eq!(status.state, WinchState::AtLimit);
    assert!(status.limit_tripped);
    assert_eq!(probe.winch_motor(), 0.0);

    stepper.run(&mut task, 1);
    assert_eq!(shared.winch.read().state, WinchState::Idle);

    // A fresh press against a tripped limit is refused.
    probe.release(buttons.winch);
    stepper.run(&mut task, 1);
    probe.press(buttons.winch);
    stepper.run(&mut task, 3);
    assert_eq!(shared.winch.read().state, WinchState::Idle);
    assert_eq!(probe.winch_motor(), 0.0);
}

#[test]
fn override_drives_past_tripped_limit_while_held() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_limit_raw(false);
    probe.press(buttons.winch_override);
    probe.press(buttons.winch);
    stepper.run(&mut task, 2);
    assert_eq!(shared.winch.read().state, WinchState::ManualOverride);
    assert_eq!(probe.winch_motor(), config.winch.manual_power);

    probe.release(buttons.winch_override);
    stepper.run(&mut task, 1);
    assert_eq!(shared.winch.read().state, WinchState::Idle);
    assert_eq!(probe.winch_motor(), 0.0);
}

#[test]
fn release_pulse_returns_piston_to_rest() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.press(buttons.winch);
    stepper.run(&mut task, 3);
    assert_eq!(probe.winch_motor(), config.winch.wind_power);

    probe.release(buttons.winch);
    probe.press(buttons.winch_release);
    let before = clock.now();
    let outcome = stepper.step(&mut task);
    assert_eq!(outcome.error, None);
    assert!(clock.now() - before >= config.winch.release_pulse());

    assert_eq!(probe.release_pulses(), 1);
    assert_eq!(probe.winch_release(), PistonCommand::REST);
    assert_eq!(probe.winch_motor(), 0.0);
    let status = shared.winch.read();
    assert_eq!(status.state, WinchState::Idle);
    assert_eq!(status.releases, 1);

    // Holding the button does not pulse again.
    stepper.advance();
    stepper.run(&mut task, 10);
    assert_eq!(probe.release_pulses(), 1);
}

#[test]
fn wind_times_out_without_limit() {
    let mut config = base_config();
    config.winch.max_wind_ms = 200;
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.press(buttons.winch);

    let mut timeouts = Vec::new();
    for _ in 0..40 {
        let outcome = stepper.run(&mut task, 1);
        if let Some(error) = outcome.error {
            assert!(outcome.faults.contains(TaskFault::TIMEOUT));
            timeouts.push(error);
        }
    }

    assert_eq!(
        timeouts,
        vec![TaskError::WindTimeout(Duration::from_millis(200))]
    );
    assert_eq!(shared.winch.read().state, WinchState::Idle);
    assert_eq!(probe.winch_motor(), 0.0);
}

#[test]
fn unreadable_limit_switch_counts_as_tripped() {
    let config = base_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_limit_unavailable(true);
    probe.press(buttons.winch);
    let outcome = stepper.run(&mut task, 2);

    assert_eq!(outcome.error, None);
    assert!(outcome.faults.contains(TaskFault::SENSOR_UNAVAILABLE));
    assert_eq!(shared.winch.read().state, WinchState::Idle);
    assert_eq!(probe.winch_motor(), 0.0);
}

#[test]
fn threshold_sensing_stops_at_setpoint() {
    let config = threshold_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_tension(1.0);
    probe.press(buttons.winch);
    stepper.run(&mut task, 3);
    assert_eq!(shared.winch.read().state, WinchState::Winding);

    probe.set_tension(2.6);
    stepper.run(&mut task, 1);
    assert_eq!(shared.winch.read().state, WinchState::AtLimit);
    assert_eq!(probe.winch_motor(), 0.0);

    // Raising the setpoint above the reading allows another wind.
    shared.setpoint.set(3.0);
    probe.release(buttons.winch);
    stepper.run(&mut task, 2);
    probe.press(buttons.winch);
    stepper.run(&mut task, 1);
    assert_eq!(shared.winch.read().state, WinchState::Winding);
}

#[test]
fn threshold_sensing_falls_back_to_last_reading() {
    let config = threshold_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_tension(1.0);
    probe.press(buttons.winch);
    stepper.run(&mut task, 2);

    probe.set_tension_unavailable(true);
    let outcome = stepper.run(&mut task, 5);
    assert_eq!(outcome.error, None);
    assert!(outcome.faults.contains(TaskFault::SENSOR_UNAVAILABLE));
    let status = shared.winch.read();
    assert_eq!(status.state, WinchState::Winding);
    assert_eq!(status.tension, Some(1.0));
}

#[test]
fn threshold_sensing_without_any_reading_refuses_to_wind() {
    let config = threshold_config();
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.set_tension_unavailable(true);
    probe.press(buttons.winch);
    stepper.run(&mut task, 3);
    assert_eq!(shared.winch.read().state, WinchState::Idle);
    assert_eq!(probe.winch_motor(), 0.0);
}

#[test]
fn plant_winds_to_limit_and_release_slackens() {
    let mut config = RobotConfig::default();
    config.simulation.winch_plant = true;
    let (mut hw, probe) = rig(&config);
    let shared = shared_for(&config);
    let clock = SimClock::new();
    let buttons = config.io.buttons;
    let polarity = config.io.limit_switch.polarity;
    let mut task = WinchTask::new(&mut hw.winch, &config.winch, polarity, buttons);
    let mut stepper = Stepper::new(&shared, &hw.sensors, &clock);

    shared.enter_mode(RobotMode::Teleop);
    probe.press(buttons.winch);

    let mut reached = false;
    for _ in 0..400 {
        stepper.run(&mut task, 1);
        probe.advance_plant(PERIOD);
        if shared.winch.read().state == WinchState::AtLimit {
            reached = true;
            break;
        }
    }
    assert!(reached, "plant never reached the limit");
    assert_eq!(probe.winch_motor(), 0.0);

    probe.release(buttons.winch);
    probe.press(buttons.winch_release);
    stepper.run(&mut task, 1);
    probe.release(buttons.winch_release);
    stepper.run(&mut task, 1);
    assert!(!shared.winch.read().limit_tripped);
}
