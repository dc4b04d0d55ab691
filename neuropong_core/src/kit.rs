// SPDX-License-Identifier: GPL-3.0
// kit.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// The entry points the neuroprocessor kit driver calls. Setup runs once per
// subsystem, then the loop functions run once per network tick. The pin lists
// are whatever the driver has left free; the cabinet wiring is fixed, so they
// are only reported.

use crate::{
    actuator::PaddleActuator,
    error::{BridgeError, tolerate},
    sampler::ObservationSampler,
};
use log::{debug, warn};

/// Owns the paddle actuator on behalf of the driver.
pub struct ActionsKit<Actuator> {
    actuator: Actuator,
}

impl<Actuator: PaddleActuator> ActionsKit<Actuator> {

    /// Wraps an actuator, which should not have been set up yet.
    pub fn new(actuator: Actuator) -> Self {
        ActionsKit {
            actuator,
        }
    }

    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    /// Called once before any actions arrive.
    pub fn setup_use_actions(&mut self, available_pins: &[u8]) -> Result<(), BridgeError> {

        debug!("setting up actions with available pins {:?}", available_pins);
        tolerate(self.actuator.setup())
    }

    /// Called once per tick with the network's actions. Returns the new paddle
    /// position; only fatal errors come back as `Err`.
    pub fn loop_use_actions(
        &mut self,
        actions: &[f64],
        _available_pins: &[u8]
    ) -> Result<u8, BridgeError> {

        self.actuator.step(actions)
    }
}

/// Owns the observation sampler on behalf of the driver.
pub struct ObservationsKit<Sampler> {
    sampler: Sampler,
}

impl<Sampler: ObservationSampler> ObservationsKit<Sampler> {

    /// Wraps a sampler, which should not have been set up yet.
    pub fn new(sampler: Sampler) -> Self {
        ObservationsKit {
            sampler,
        }
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Called once before any observations are requested.
    pub fn setup_read_observations(&mut self, available_pins: &[u8]) -> Result<(), BridgeError> {

        debug!("setting up observations with available pins {:?}", available_pins);
        tolerate(self.sampler.setup())
    }

    /// Called once per spike encoder per tick, with indices rising from 0. If the
    /// refresh on index 0 fails, the previous cycle's value is served instead.
    pub fn loop_read_observation(&mut self, observation_index: u8) -> Result<f64, BridgeError> {

        let index = observation_index as usize;
        match self.sampler.sample(index) {
            Err(sample_error) if !sample_error.is_fatal() => {
                warn!("serving stale observation {}: {}", index, sample_error);
                Ok(self.sampler.buffer().get(index)? as f64)
            },
            result => result,
        }
    }
}
