// SPDX-License-Identifier: GPL-3.0
// actuator.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::{
    config::Travel,
    error::BridgeError,
};
use neuropong_utility::CustomFloat;

/// This module contains the default paddle actuator implementation, which drives
/// an AD5242 digital potentiometer wired into the cabinet's paddle input.
pub mod pong_actuator;

/// The closed set of movement intents the network can express.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionCode {
    NoOp,
    Increment,
    Decrement,
}

impl ActionCode {

    /// Decodes a raw action value, truncating toward zero. The index is only
    /// used to describe the failure.
    pub fn decode(index: usize, value: f64) -> Result<Self, BridgeError> {

        match value.truncate_to_code() {
            Some(0) => Ok(ActionCode::NoOp),
            Some(1) => Ok(ActionCode::Increment),
            Some(2) => Ok(ActionCode::Decrement),
            _ => Err(BridgeError::UnrecognisedAction { index, value }),
        }
    }

    /// The signed position change this action asks for.
    pub fn delta(self, step_size: u8) -> i32 {
        match self {
            ActionCode::NoOp => 0,
            ActionCode::Increment => step_size as i32,
            ActionCode::Decrement => -(step_size as i32),
        }
    }
}

/// Folds the actions over the current position, left to right, then saturates
/// the result into the travel. Clamping happens once, after the fold, so
/// `[Increment, Decrement]` from the top bound lands back on the top bound.
/// Any unrecognised action aborts the whole fold, as does an inverted travel.
/// The accumulator saturates, so arbitrarily long action lists stay in travel.
pub fn update_position(
    actions: &[f64],
    current: u8,
    step_size: u8,
    travel: Travel
) -> Result<u8, BridgeError> {

    travel.validate()?;

    let mut accumulator = current as i32;
    for (index, &value) in actions.iter().enumerate() {
        accumulator = accumulator.saturating_add(ActionCode::decode(index, value)?.delta(step_size));
    }

    Ok(travel.clamp(accumulator))
}

/// This trait provides an implementation-opaque way of driving the paddle from
/// elsewhere in the system, mainly the kit entry points.
pub trait PaddleActuator {

    /// Implementations must bring the status line to its idle state.
    fn setup(&mut self) -> Result<(), BridgeError>;

    /// Implementations must return the current logical paddle position.
    fn position(&self) -> u8;

    /// Implementations must range-check and write the value to the device.
    fn commit_position(&mut self, value: i32) -> Result<(), BridgeError>;

    /// Implementations must wiggle the paddle either side of the value and then
    /// restore it.
    fn jitter(&mut self, value: u8) -> Result<(), BridgeError>;

    /// Implementations must read one byte back from the device.
    fn read_position(&mut self) -> Result<u8, BridgeError>;

    /// Implementations must run one full control cycle and return the new position.
    fn step(&mut self, actions: &[f64]) -> Result<u8, BridgeError>;
}
