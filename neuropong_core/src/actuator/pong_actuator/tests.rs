// SPDX-License-Identifier: GPL-3.0
// tests.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::PongActuator;
use crate::{
    actuator::{PaddleActuator, update_position},
    config::{ActuatorConfig, POT_ADDRESS, POT_INSTRUCTION, POT_MAX, POT_MIN, Travel},
    error::BridgeError,
    sim::{SimClock, SimLine, SimPotentiometer},
};
use embedded_hal::digital::OutputPin;

// Tests for the paddle actuator.

type SimActuator = PongActuator<SimPotentiometer, SimLine, SimClock>;

fn travel() -> Travel {
    Travel::new(POT_MIN, POT_MAX)
}

fn build(config: ActuatorConfig) -> (SimActuator, SimPotentiometer, SimLine, SimClock) {

    let pot = SimPotentiometer::new();
    let status = SimLine::new();
    let clock = SimClock::new();
    let actuator = PongActuator::new(config, pot.clone(), status.clone(), clock.clone())
        .expect("test config is valid");

    (actuator, pot, status, clock)
}

#[test]
fn update_position_should_stay_in_travel_for_any_valid_actions() {

    // Every starting position, against a spread of action sequences.
    let sequences: [&[f64]; 6] = [
        &[1.0; 20],
        &[2.0; 20],
        &[1.0, 2.0, 1.0, 1.0, 0.0],
        &[2.0, 2.0, 0.0, 1.0, 2.0, 2.0, 2.0],
        &[],
        &[0.0, 0.0, 0.0],
    ];

    for start in POT_MIN..=POT_MAX {
        for actions in sequences {
            for step_size in [1_u8, 4, 9, 255] {
                let output = update_position(actions, start, step_size, travel()).unwrap();
                assert!((POT_MIN..=POT_MAX).contains(&output));
            }
        }
    }
}

#[test]
fn update_position_should_leave_position_alone_on_no_op() {

    for start in POT_MIN..=POT_MAX {
        assert_eq!(update_position(&[0.0], start, 4, travel()), Ok(start));
    }
}

#[test]
fn update_position_should_saturate_at_bounds() {

    assert_eq!(update_position(&[1.0], POT_MAX, 4, travel()), Ok(POT_MAX));
    assert_eq!(update_position(&[2.0], POT_MIN, 4, travel()), Ok(POT_MIN));
}

#[test]
fn update_position_should_cancel_opposing_actions_away_from_bounds() {

    let start = 0x1A;

    assert_eq!(update_position(&[1.0, 2.0], start, 4, travel()), Ok(start));
    assert_eq!(update_position(&[2.0, 1.0], start, 4, travel()), Ok(start));
}

#[test]
fn update_position_should_clamp_after_the_whole_fold() {

    // Clamping is applied once, after every action has been folded in, so an
    // overshoot followed by a correction comes back to the starting bound rather
    // than ending one step inside it.
    assert_eq!(update_position(&[1.0, 2.0], POT_MAX, 4, travel()), Ok(POT_MAX));
    assert_ne!(update_position(&[1.0, 2.0], POT_MAX, 4, travel()), Ok(POT_MAX - 4));
    assert_eq!(update_position(&[2.0, 1.0], POT_MIN, 4, travel()), Ok(POT_MIN));
}

#[test]
fn update_position_should_not_wrap_below_zero() {

    let low = Travel::new(0, 0x2B);

    assert_eq!(update_position(&[2.0, 2.0, 2.0], 1, 4, low), Ok(0));
}

#[test]
fn update_position_should_truncate_fractional_actions() {

    assert_eq!(update_position(&[1.9], 0x1A, 4, travel()), Ok(0x1E));
    assert_eq!(update_position(&[2.5], 0x1A, 4, travel()), Ok(0x16));
    assert_eq!(update_position(&[0.99], 0x1A, 4, travel()), Ok(0x1A));
}

#[test]
fn update_position_should_reject_unknown_actions_from_any_start() {

    for start in POT_MIN..=POT_MAX {
        for value in [3.0, -1.0, 42.0, f64::NAN, f64::INFINITY] {
            let output = update_position(&[1.0, value], start, 4, travel());
            assert!(matches!(output, Err(BridgeError::UnrecognisedAction { index: 1, .. })));
            assert!(output.unwrap_err().is_fatal());
        }
    }
}

#[test]
fn update_position_should_saturate_very_long_action_lists() {

    // Enough full-size steps to run well past the range of the accumulator.
    let count = 9_000_000;

    assert_eq!(update_position(&vec![1.0; count], 0x20, 255, travel()), Ok(POT_MAX));
    assert_eq!(update_position(&vec![2.0; count], 0x20, 255, travel()), Ok(POT_MIN));
}

#[test]
fn update_position_should_reject_inverted_travel() {

    let output = update_position(&[1.0], 0x20, 4, Travel::new(0x30, 0x10));

    assert!(matches!(output, Err(BridgeError::InvalidConfig(_))));
}

#[test]
fn new_actuator_should_start_at_midpoint() {

    let (actuator, _, _, _) = build(ActuatorConfig::new());

    assert_eq!(actuator.position(), travel().midpoint());
}

#[test]
fn new_actuator_should_reject_invalid_config() {

    let config = ActuatorConfig::new().with_step_size(0);
    let output = PongActuator::new(config, SimPotentiometer::new(), SimLine::new(), SimClock::new());

    assert!(matches!(output, Err(BridgeError::InvalidConfig(_))));
}

#[test]
fn setup_should_leave_status_line_idle() {

    let (mut actuator, _, status, _) = build(ActuatorConfig::new());
    actuator.setup().unwrap();

    assert_eq!(status.history(), vec![false]);
}

#[test]
fn commit_position_should_write_instruction_and_value() {

    let (mut actuator, pot, _, _) = build(ActuatorConfig::new());
    actuator.commit_position(0x20).unwrap();

    assert_eq!(pot.writes(), vec![(POT_ADDRESS, vec![POT_INSTRUCTION, 0x20])]);
    assert_eq!(pot.wiper(), 0x20);
}

#[test]
fn commit_position_should_fail_fast_on_unrepresentable_values() {

    let (mut actuator, pot, status, _) = build(ActuatorConfig::new());
    actuator.setup().unwrap();
    status.clone().set_high().unwrap();

    for value in [-1, 256, 1000] {
        let output = actuator.commit_position(value);
        assert_eq!(output, Err(BridgeError::PositionOutOfRange(value)));
        assert!(output.unwrap_err().is_fatal());
    }

    // Nothing reached the bus, and the status line shows the fault.
    assert!(pot.writes().is_empty());
    assert!(!status.is_high());
}

#[test]
fn commit_position_should_report_but_survive_a_missing_acknowledge() {

    let (mut actuator, pot, _, _) = build(ActuatorConfig::new());
    pot.nack_next_writes(1);

    let output = actuator.commit_position(0x20);
    assert!(matches!(output, Err(BridgeError::PotWrite(_))));
    assert!(!output.unwrap_err().is_fatal());

    // The next write goes through.
    actuator.commit_position(0x21).unwrap();
    assert_eq!(pot.written_values(), vec![0x21]);
}

#[test]
fn jitter_should_issue_three_writes_with_settle_delays() {

    let (mut actuator, pot, _, clock) = build(ActuatorConfig::new());
    actuator.jitter(0x1A).unwrap();

    assert_eq!(pot.written_values(), vec![0x1C, 0x18, 0x1A]);
    assert_eq!(clock.elapsed_ms(), 66);
}

#[test]
fn jitter_should_clamp_each_offset_on_its_own() {

    let (mut actuator, pot, _, _) = build(ActuatorConfig::new());
    actuator.jitter(POT_MAX).unwrap();
    actuator.jitter(POT_MIN).unwrap();

    assert_eq!(
        pot.written_values(),
        vec![POT_MAX, POT_MAX - 2, POT_MAX, POT_MIN + 2, POT_MIN, POT_MIN]
    );
}

#[test]
fn jitter_should_use_configured_settle_delay() {

    let (mut actuator, _, _, clock) = build(ActuatorConfig::new().with_settle_ms(5));
    actuator.jitter(0x1A).unwrap();

    assert_eq!(clock.elapsed_ms(), 10);
}

#[test]
fn jitter_should_finish_even_if_a_write_is_dropped() {

    let (mut actuator, pot, _, _) = build(ActuatorConfig::new());
    pot.nack_next_writes(1);
    actuator.jitter(0x1A).unwrap();

    assert_eq!(pot.written_values(), vec![0x18, 0x1A]);
}

#[test]
fn read_position_should_return_wiper() {

    let (mut actuator, _, _, _) = build(ActuatorConfig::new());
    actuator.commit_position(0x22).unwrap();

    assert_eq!(actuator.read_position(), Ok(0x22));
}

#[test]
fn step_should_commit_beat_and_read_back() {

    let (mut actuator, pot, status, _) = build(ActuatorConfig::new());
    actuator.setup().unwrap();

    let output = actuator.step(&[1.0]).unwrap();

    assert_eq!(output, 0x1E);
    assert_eq!(actuator.position(), 0x1E);
    assert_eq!(pot.written_values(), vec![0x1E]);
    assert_eq!(status.toggles(), 1);
    assert_eq!(pot.reads(), 1);
}

#[test]
fn step_should_keep_going_when_the_write_is_dropped() {

    let (mut actuator, pot, status, _) = build(ActuatorConfig::new());
    pot.nack_next_writes(1);

    assert_eq!(actuator.step(&[1.0]), Ok(0x1E));
    assert_eq!(status.toggles(), 1);

    // The next cycle re-sends the full position.
    assert_eq!(actuator.step(&[0.0]), Ok(0x1E));
    assert_eq!(pot.written_values(), vec![0x1E]);
}

#[test]
fn step_should_fail_fast_on_unknown_action_and_keep_position() {

    for start in POT_MIN..=POT_MAX {
        let (mut actuator, pot, status, _) = build(ActuatorConfig::new());
        actuator.setup().unwrap();
        actuator.position = start;
        status.clone().set_high().unwrap();

        let output = actuator.step(&[7.0]);

        assert!(matches!(output, Err(BridgeError::UnrecognisedAction { index: 0, .. })));
        assert_eq!(actuator.position(), start);
        assert!(pot.written_values().is_empty());
        assert!(!status.is_high());
    }
}

#[test]
fn step_should_climb_by_step_size_until_pinned() {

    // Ten increments from the midpoint with a step size of four.
    let (mut actuator, pot, _, _) = build(ActuatorConfig::new().with_step_size(4));
    let mut expected = travel().midpoint() as i32;
    let mut positions = vec![];

    for _ in 0..10 {
        positions.push(actuator.step(&[1.0]).unwrap());
    }

    let mut expected_positions = vec![];
    for _ in 0..10 {
        expected = (expected + 4).min(POT_MAX as i32);
        expected_positions.push(expected as u8);
    }

    assert_eq!(positions, expected_positions);
    assert_eq!(*positions.last().unwrap(), POT_MAX);
    assert_eq!(pot.written_values(), expected_positions);
}

#[test]
fn step_should_jitter_when_parked_on_a_bound_if_enabled() {

    let config = ActuatorConfig::new().with_jitter_at_bounds(true);
    let (mut actuator, pot, _, clock) = build(config);

    // Drive onto the top bound; arriving there does not jitter.
    while actuator.step(&[1.0]).unwrap() != POT_MAX {}
    let writes_on_arrival = pot.written_values().len();
    assert_eq!(clock.elapsed_ms(), 0);

    // Staying there does.
    actuator.step(&[1.0]).unwrap();
    let written = pot.written_values();

    assert_eq!(written.len(), writes_on_arrival + 4);
    assert_eq!(&written[writes_on_arrival..], &[POT_MAX, POT_MAX, POT_MAX - 2, POT_MAX]);
    assert_eq!(clock.elapsed_ms(), 66);
}

#[test]
fn step_should_not_jitter_when_disabled() {

    let (mut actuator, _, _, clock) = build(ActuatorConfig::new());

    for _ in 0..20 {
        actuator.step(&[1.0]).unwrap();
    }

    assert_eq!(clock.elapsed_ms(), 0);
}

#[test]
fn release_should_hand_back_hardware() {

    let (actuator, _, _, _) = build(ActuatorConfig::new());
    let (pot, _, _) = actuator.release();

    assert_eq!(pot.reads(), 0);
}
