// SPDX-License-Identifier: GPL-3.0
// config.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::error::BridgeError;

/// Bottom of the usable paddle travel. Calibrated against the cabinet when the
/// potentiometer is powered from the controller's 5V rail, with the dead zone at
/// the extreme trimmed off.
pub const POT_MIN: u8 = 0x0A;

/// Top of the usable paddle travel. Driving the potentiometer past this point
/// faults the cabinet.
pub const POT_MAX: u8 = 0x2B;

/// Seven-bit bus address of the AD5242 digital potentiometer.
pub const POT_ADDRESS: u8 = 0x2C;

/// Instruction byte selecting RDAC2, with midscale reset, shutdown and both
/// output logic pins off.
pub const POT_INSTRUCTION: u8 = 0x80;

/// Full-scale resistance of the potentiometer.
pub const POT_FULL_SCALE_OHMS: u32 = 1_000_000;

/// Clock rate the potentiometer bus must be brought up at.
pub const POT_BUS_FREQUENCY_HZ: u32 = 400_000;

/// Clock rate of the observation link. The controller is the receiving party,
/// mode 0, MSB first, 8-bit words.
pub const LINK_FREQUENCY_HZ: u32 = 1_000_000;

/// Byte clocked out while reading each observation sample.
pub const LINK_DUMMY_BYTE: u8 = 0xFF;

/// Rows in the downsampled observation grid.
pub const OBSERVATION_ROWS: usize = 10;

/// Columns in the downsampled observation grid.
pub const OBSERVATION_COLS: usize = 16;

/// Number of samples in one observation cycle.
pub const OBSERVATION_COUNT: usize = OBSERVATION_ROWS * OBSERVATION_COLS;

/// Default paddle movement per action.
pub const DEFAULT_STEP_SIZE: u8 = 4;

/// Default jitter offset either side of the current position.
pub const DEFAULT_JITTER_SIZE: u8 = 2;

/// Default wait between jitter writes, roughly one frame on the cabinet.
pub const DEFAULT_SETTLE_MS: u32 = 33;

/// The usable travel of the paddle, expressed as potentiometer settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Travel {
    pub min: u8,
    pub max: u8,
}

impl Travel {

    /// Creates a new travel range.
    pub fn new(min: u8, max: u8) -> Self {
        Travel {
            min,
            max,
        }
    }

    /// The cold-start paddle position.
    pub fn midpoint(&self) -> u8 {
        ((self.min as u16 + self.max as u16) / 2) as u8
    }

    /// Checks the travel is not inverted.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.min > self.max {
            return Err(BridgeError::InvalidConfig(format!(
                "travel minimum {:#04x} is above maximum {:#04x}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Saturates a signed value into the travel range. An inverted travel
    /// saturates to its maximum rather than panicking.
    pub fn clamp(&self, value: i32) -> u8 {
        value.max(self.min as i32).min(self.max as i32) as u8
    }

    /// Tells us if the value sits on either end of the travel.
    pub fn is_pinned(&self, value: u8) -> bool {
        value == self.min || value == self.max
    }
}

/// Everything the paddle actuator needs to know about the cabinet it drives.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorConfig {
    pub address: u8,
    pub instruction: u8,
    pub travel: Travel,
    pub step_size: u8,
    pub jitter_size: u8,
    pub settle_ms: u32,
    pub full_scale_ohms: u32,

    // When set, step() jitters the paddle after committing a position that
    // sits on a travel bound.
    pub jitter_at_bounds: bool,
}

impl ActuatorConfig {

    /// Creates a config holding the calibrated cabinet values.
    pub fn new() -> Self {
        ActuatorConfig {
            address: POT_ADDRESS,
            instruction: POT_INSTRUCTION,
            travel: Travel::new(POT_MIN, POT_MAX),
            step_size: DEFAULT_STEP_SIZE,
            jitter_size: DEFAULT_JITTER_SIZE,
            settle_ms: DEFAULT_SETTLE_MS,
            full_scale_ohms: POT_FULL_SCALE_OHMS,
            jitter_at_bounds: false,
        }
    }

    pub fn with_travel(mut self, travel: Travel) -> Self {
        self.travel = travel;
        self
    }

    pub fn with_step_size(mut self, step_size: u8) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_jitter_size(mut self, jitter_size: u8) -> Self {
        self.jitter_size = jitter_size;
        self
    }

    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    pub fn with_jitter_at_bounds(mut self, enabled: bool) -> Self {
        self.jitter_at_bounds = enabled;
        self
    }

    /// Checks that the config cannot drive the paddle somewhere unexpected.
    pub fn validate(&self) -> Result<(), BridgeError> {

        self.travel.validate()?;

        if self.step_size == 0 {
            return Err(BridgeError::InvalidConfig(String::from("step size must be non-zero")));
        }

        if self.address > 0x7F {
            return Err(BridgeError::InvalidConfig(format!(
                "address {:#04x} is not a seven-bit address",
                self.address
            )));
        }

        Ok(())
    }
}
