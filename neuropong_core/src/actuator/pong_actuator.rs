// SPDX-License-Identifier: GPL-3.0
// pong_actuator.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{PaddleActuator, update_position};
use crate::{
    config::ActuatorConfig,
    error::{BridgeError, tolerate},
};
use embedded_hal::{
    delay::DelayNs,
    digital::StatefulOutputPin,
    i2c::{Error as _, I2c},
};
use log::{debug, error, info, trace, warn};
use neuropong_utility::WiperResistance;

/// This struct drives the paddle of the Pong cabinet through a digital
/// potentiometer. It owns the logical paddle position between cycles, along with
/// the bus, the status/heartbeat line and the delay source used by jitter.
pub struct PongActuator<Bus, Status, Delay> {

    // Hardware.
    bus: Bus,
    status: Status,
    delay: Delay,

    // Calibration and tuning.
    config: ActuatorConfig,

    // Logical paddle position, always inside the configured travel.
    position: u8,
}

/// Implementation functions for the actuator itself.
impl<Bus, Status, Delay> PongActuator<Bus, Status, Delay>
where
    Bus: I2c,
    Status: StatefulOutputPin,
    Delay: DelayNs,
{

    /// Creates a new actuator with the paddle at the middle of its travel. The bus
    /// must already be running at `POT_BUS_FREQUENCY_HZ` with pull-ups enabled.
    pub fn new(
        config: ActuatorConfig,
        bus: Bus,
        status: Status,
        delay: Delay
    ) -> Result<Self, BridgeError> {

        config.validate()?;

        Ok(PongActuator {
            bus,
            status,
            delay,
            position: config.travel.midpoint(),
            config,
        })
    }

    /// Gives the hardware back.
    pub fn release(self) -> (Bus, Status, Delay) {
        (self.bus, self.status, self.delay)
    }

    /// Drives the status line to its error state. A failure here is only logged,
    /// since we are already on the way out.
    fn signal_fault(&mut self) {
        if self.status.set_low().is_err() {
            warn!("could not drive status line to its error state");
        }
    }

    /// Toggles the heartbeat.
    fn heartbeat(&mut self) -> Result<(), BridgeError> {
        self.status.toggle().map_err(|_| {
            warn!("could not toggle heartbeat");
            BridgeError::Indicator
        })
    }
}

/// Implementation functions to be called from anything that understands what
/// a PaddleActuator object is.
impl<Bus, Status, Delay> PaddleActuator for PongActuator<Bus, Status, Delay>
where
    Bus: I2c,
    Status: StatefulOutputPin,
    Delay: DelayNs,
{

    /// Puts the status line in its idle state.
    fn setup(&mut self) -> Result<(), BridgeError> {

        self.status.set_low().map_err(|_| BridgeError::Indicator)?;

        info!(
            "paddle actuator ready: address {:#04x}, instruction {:#04x}, travel {:#04x}..={:#04x}, start {:#04x}",
            self.config.address,
            self.config.instruction,
            self.config.travel.min,
            self.config.travel.max,
            self.position
        );

        Ok(())
    }

    /// Returns the logical paddle position.
    fn position(&self) -> u8 {
        self.position
    }

    /// Writes `[instruction, value]` to the potentiometer. A value that does not
    /// fit in a byte is fatal; a missing acknowledge is not, since the next cycle
    /// sends the full position again.
    fn commit_position(&mut self, value: i32) -> Result<(), BridgeError> {

        let Ok(setting) = u8::try_from(value) else {
            error!("refusing to write position {} to the potentiometer", value);
            self.signal_fault();
            return Err(BridgeError::PositionOutOfRange(value));
        };

        let payload = [self.config.instruction, setting];
        if let Err(bus_error) = self.bus.write(self.config.address, &payload) {
            let kind = bus_error.kind();
            warn!("potentiometer write of {:#04x} failed: {}", setting, kind);
            return Err(BridgeError::PotWrite(kind));
        }

        trace!("potentiometer set to {:#04x}", setting);
        Ok(())
    }

    /// Writes value + jitter, waits, writes value - jitter, waits, then writes the
    /// value back. Each offset is clamped to the travel on its own.
    fn jitter(&mut self, value: u8) -> Result<(), BridgeError> {

        let jitter_size = self.config.jitter_size as i32;
        let right = self.config.travel.clamp(value as i32 + jitter_size);
        let left = self.config.travel.clamp(value as i32 - jitter_size);

        trace!("jittering around {:#04x} ({:#04x}, {:#04x})", value, right, left);

        tolerate(self.commit_position(right as i32))?;
        self.delay.delay_ms(self.config.settle_ms);
        tolerate(self.commit_position(left as i32))?;
        self.delay.delay_ms(self.config.settle_ms);
        tolerate(self.commit_position(value as i32))
    }

    /// Reads a single byte back from the potentiometer.
    fn read_position(&mut self) -> Result<u8, BridgeError> {

        let mut buffer = [0_u8; 1];
        self.bus.read(self.config.address, &mut buffer).map_err(|bus_error| {
            let kind = bus_error.kind();
            warn!("potentiometer read failed: {}", kind);
            BridgeError::PotRead(kind)
        })?;

        Ok(buffer[0])
    }

    /// Runs one control cycle: integrate the actions, commit the new position,
    /// beat the heart, and read the device back.
    fn step(&mut self, actions: &[f64]) -> Result<u8, BridgeError> {

        let position = match update_position(
            actions,
            self.position,
            self.config.step_size,
            self.config.travel
        ) {
            Ok(position) => position,
            Err(update_error) => {
                error!("{}", update_error);
                self.signal_fault();
                return Err(update_error);
            }
        };

        let moved = position != self.position;
        self.position = position;

        debug!(
            "paddle at {:#04x} (~{:.0} ohms)",
            position,
            position.wiper_ohms(self.config.full_scale_ohms)
        );

        tolerate(self.commit_position(position as i32))?;

        // Keep a paddle parked on a bound visible to the event camera.
        if self.config.jitter_at_bounds && !moved && self.config.travel.is_pinned(position) {
            self.jitter(position)?;
        }

        tolerate(self.heartbeat())?;

        if let Ok(readback) = self.read_position() {
            trace!("potentiometer reads back {:#04x}", readback);
        }

        Ok(position)
    }
}

#[cfg(test)]
mod tests;
