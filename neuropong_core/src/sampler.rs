// SPDX-License-Identifier: GPL-3.0
// sampler.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::{
    config::{OBSERVATION_COLS, OBSERVATION_COUNT},
    error::BridgeError,
};
use std::fmt;

/// This module contains the default observation sampler implementation, which
/// reads downsampled event-camera frames over a synchronised serial link.
pub mod pong_sampler;

/// The live set of observation samples for one cycle. Its length never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationBuffer {
    samples: [u8; OBSERVATION_COUNT],
}

impl ObservationBuffer {

    /// Creates a new, zeroed buffer.
    pub fn new() -> Self {
        ObservationBuffer {
            samples: [0; OBSERVATION_COUNT],
        }
    }

    /// Returns the sample at the index, or a fatal error if the index falls off
    /// the end.
    pub fn get(&self, index: usize) -> Result<u8, BridgeError> {
        self.samples
            .get(index)
            .copied()
            .ok_or(BridgeError::ObservationIndexOutOfRange {
                index,
                len: OBSERVATION_COUNT,
            })
    }

    /// Replaces every sample at once.
    pub fn replace(&mut self, samples: [u8; OBSERVATION_COUNT]) {
        self.samples = samples;
    }
}

/// Prints the samples as a grid, one observation row per line.
impl fmt::Display for ObservationBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.samples.chunks(OBSERVATION_COLS) {
            let line = row
                .iter()
                .map(|sample| sample.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// This trait provides an implementation-opaque way of pulling observations from
/// elsewhere in the system, mainly the kit entry points.
pub trait ObservationSampler {

    /// Implementations must leave the ready line inactive and the link ready to
    /// accept transfers.
    fn setup(&mut self) -> Result<(), BridgeError>;

    /// Implementations must read a whole cycle's worth of samples and swap them
    /// in, or leave the buffer untouched on failure.
    fn refresh(&mut self) -> Result<(), BridgeError>;

    /// Implementations must refresh on index 0, then return the sample at the index.
    fn sample(&mut self, index: usize) -> Result<f64, BridgeError>;

    /// Implementations must return the live buffer.
    fn buffer(&self) -> &ObservationBuffer;
}

#[cfg(test)]
mod tests {

    use super::ObservationBuffer;
    use crate::{
        config::OBSERVATION_COUNT,
        error::BridgeError,
    };

    #[test]
    fn get_should_reject_index_past_the_end() {

        let buffer = ObservationBuffer::new();

        assert_eq!(
            buffer.get(OBSERVATION_COUNT),
            Err(BridgeError::ObservationIndexOutOfRange { index: 160, len: 160 })
        );
    }

    #[test]
    fn display_should_print_sixteen_samples_per_row() {

        let mut samples = [0_u8; OBSERVATION_COUNT];
        samples[17] = 1;
        let mut buffer = ObservationBuffer::new();
        buffer.replace(samples);

        let printed = buffer.to_string();
        let lines: Vec<&str> = printed.lines().collect();

        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "0 1 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
    }
}
