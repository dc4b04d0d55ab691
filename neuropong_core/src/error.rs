// SPDX-License-Identifier: GPL-3.0
// error.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use embedded_hal::{i2c, spi};
use thiserror::Error;

/// This enum represents everything that can go wrong while driving the paddle or
/// sampling observations. Fatal variants indicate a contract violation from the
/// upstream network or the embedding driver, and must not be retried. The others
/// are bus-level hiccups that the next cycle naturally retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {

    /// An action value did not decode to one of the known action codes.
    #[error("action {index} has value {value}, which is not a recognised action code")]
    UnrecognisedAction { index: usize, value: f64 },

    /// A position could not be represented on the potentiometer.
    #[error("position {0} is not representable on the potentiometer")]
    PositionOutOfRange(i32),

    /// An observation was requested outside the buffer.
    #[error("observation index {index} is outside the buffer of length {len}")]
    ObservationIndexOutOfRange { index: usize, len: usize },

    /// Configuration values that would put the hardware at risk.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The potentiometer did not acknowledge a write.
    #[error("potentiometer write failed: {0}")]
    PotWrite(i2c::ErrorKind),

    /// The potentiometer read-back failed.
    #[error("potentiometer read failed: {0}")]
    PotRead(i2c::ErrorKind),

    /// The observation link failed or stalled mid-transfer.
    #[error("observation link transfer failed: {0}")]
    Link(spi::ErrorKind),

    /// A status, heartbeat or ready line could not be driven.
    #[error("indicator line could not be driven")]
    Indicator,
}

impl BridgeError {

    /// Returns true if the embedding driver should halt on this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::UnrecognisedAction { .. }
                | BridgeError::PositionOutOfRange(_)
                | BridgeError::ObservationIndexOutOfRange { .. }
                | BridgeError::InvalidConfig(_)
        )
    }
}

/// Swallows recoverable errors, which are logged where they happen, and passes
/// fatal ones through.
pub(crate) fn tolerate(result: Result<(), BridgeError>) -> Result<(), BridgeError> {
    match result {
        Err(error) if error.is_fatal() => Err(error),
        _ => Ok(()),
    }
}
