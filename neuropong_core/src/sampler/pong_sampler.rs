// SPDX-License-Identifier: GPL-3.0
// pong_sampler.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{ObservationBuffer, ObservationSampler};
use crate::{
    config::{LINK_DUMMY_BYTE, OBSERVATION_COUNT},
    error::BridgeError,
};
use embedded_hal::{
    digital::StatefulOutputPin,
    spi::{Error as _, SpiBus},
};
use log::{debug, info, trace, warn};

/// This struct pulls observation samples over the serial link from the host that
/// downsamples the event camera. The ready line tells the host when we are
/// clocking, and the status line doubles as a heartbeat.
pub struct PongSampler<Link, Ready, Status> {

    // Hardware.
    link: Link,
    ready: Ready,
    status: Status,

    // Live observations.
    buffer: ObservationBuffer,
}

/// Implementation functions for the sampler itself.
impl<Link, Ready, Status> PongSampler<Link, Ready, Status>
where
    Link: SpiBus<u8>,
    Ready: StatefulOutputPin,
    Status: StatefulOutputPin,
{

    /// Creates a new sampler with a zeroed buffer. The link must already be
    /// configured as the receiving party at `LINK_FREQUENCY_HZ`.
    pub fn new(link: Link, ready: Ready, status: Status) -> Self {
        PongSampler {
            link,
            ready,
            status,
            buffer: ObservationBuffer::new(),
        }
    }

    /// Gives the hardware back.
    pub fn release(self) -> (Link, Ready, Status) {
        (self.link, self.ready, self.status)
    }

    /// Clocks in one cycle of samples, one byte transfer per sample.
    fn read_block(&mut self) -> Result<[u8; OBSERVATION_COUNT], BridgeError> {

        let mut incoming = [0_u8; OBSERVATION_COUNT];
        for sample in incoming.iter_mut() {
            let mut word = [LINK_DUMMY_BYTE];
            self.link.transfer_in_place(&mut word).map_err(|link_error| {
                BridgeError::Link(link_error.kind())
            })?;
            *sample = word[0];
        }

        Ok(incoming)
    }

    /// Toggles the heartbeat, logging rather than failing.
    fn heartbeat(&mut self) {
        if self.status.toggle().is_err() {
            warn!("could not toggle sampler heartbeat");
        }
    }
}

/// Implementation functions to be called from anything that understands what
/// an ObservationSampler object is.
impl<Link, Ready, Status> ObservationSampler for PongSampler<Link, Ready, Status>
where
    Link: SpiBus<u8>,
    Ready: StatefulOutputPin,
    Status: StatefulOutputPin,
{

    /// Lowers the ready line, then raises the status line once everything is up.
    fn setup(&mut self) -> Result<(), BridgeError> {

        self.status.set_low().map_err(|_| BridgeError::Indicator)?;
        self.ready.set_low().map_err(|_| BridgeError::Indicator)?;
        self.status.set_high().map_err(|_| BridgeError::Indicator)?;

        info!("observation sampler ready for {} samples per cycle", OBSERVATION_COUNT);
        Ok(())
    }

    /// Raises the ready line, clocks in a full cycle, lowers the ready line, then
    /// swaps the new samples in. A failed transfer leaves the live buffer as it
    /// was. A complete block is kept even if the ready line then fails to drop.
    /// The sampler never gives up on a quiet link by itself; a link that can
    /// detect a stall reports it as an error.
    fn refresh(&mut self) -> Result<(), BridgeError> {

        self.ready.set_high().map_err(|_| BridgeError::Indicator)?;
        let incoming = self.read_block();
        let lowered = self.ready.set_low().map_err(|_| {
            warn!("could not lower ready line after transfer");
            BridgeError::Indicator
        });

        match incoming {
            Ok(samples) => {
                self.buffer.replace(samples);
                trace!("observations refreshed");
                lowered
            },
            Err(link_error) => {
                warn!("observation refresh abandoned: {}", link_error);
                Err(link_error)
            },
        }
    }

    /// Refreshes on index 0, then returns the sample. Callers must walk the
    /// indices upward from 0 within a cycle.
    fn sample(&mut self, index: usize) -> Result<f64, BridgeError> {

        if index >= OBSERVATION_COUNT {
            return Err(BridgeError::ObservationIndexOutOfRange {
                index,
                len: OBSERVATION_COUNT,
            });
        }

        if index == 0 {
            self.refresh()?;
            debug!("observation cycle:\n{}", self.buffer);
        }

        self.heartbeat();
        Ok(self.buffer.get(index)? as f64)
    }

    /// Returns the live buffer.
    fn buffer(&self) -> &ObservationBuffer {
        &self.buffer
    }
}
