// SPDX-License-Identifier: GPL-3.0
// sim.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Stand-ins for the cabinet hardware, used by the tests and by the basic binary.
// Each device is a cheap handle onto shared state, so a clone can be kept for
// inspection after another has been handed to an actuator or sampler.
// Everything here is single-threaded, and only the most recent HISTORY_DEPTH
// entries of any log are kept so long runs stay flat in memory.

use embedded_hal::{
    delay::DelayNs,
    digital::{self, OutputPin, StatefulOutputPin},
    i2c::{self, I2c, NoAcknowledgeSource, Operation},
    spi::{self, SpiBus},
};
use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
};

/// Entries kept in each recorded log.
pub const HISTORY_DEPTH: usize = 256;

/// Appends to a log, dropping the oldest entry once it is full.
fn record<T>(log: &mut VecDeque<T>, entry: T) {
    if log.len() == HISTORY_DEPTH {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Errors the simulated potentiometer can raise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimBusError {
    Nack,
}

impl i2c::Error for SimBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
    }
}

/// Errors a simulated output line can raise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimLineError {
    Stuck,
}

impl digital::Error for SimLineError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Errors the simulated observation link can raise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimLinkError {
    Stalled,
}

impl spi::Error for SimLinkError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

struct PotentiometerState {
    wiper: u8,
    writes: VecDeque<(u8, Vec<u8>)>,
    reads: usize,
    nacks_pending: usize,
}

/// A digital potentiometer that records every payload written to it. A two
/// byte write moves the wiper to the second byte, and reads return the wiper.
#[derive(Clone)]
pub struct SimPotentiometer {
    state: Rc<RefCell<PotentiometerState>>,
}

impl SimPotentiometer {

    /// Creates a new potentiometer with the wiper at zero.
    pub fn new() -> Self {
        SimPotentiometer {
            state: Rc::new(RefCell::new(PotentiometerState {
                wiper: 0,
                writes: VecDeque::new(),
                reads: 0,
                nacks_pending: 0,
            })),
        }
    }

    /// The current wiper setting.
    pub fn wiper(&self) -> u8 {
        self.state.borrow().wiper
    }

    /// Recent acknowledged writes as `(address, payload)`, oldest first.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.state.borrow().writes.iter().cloned().collect()
    }

    /// The wiper value carried by each recent acknowledged write.
    pub fn written_values(&self) -> Vec<u8> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter_map(|(_, payload)| payload.get(1).copied())
            .collect()
    }

    /// The number of read operations seen.
    pub fn reads(&self) -> usize {
        self.state.borrow().reads
    }

    /// Makes the next `count` writes go unacknowledged.
    pub fn nack_next_writes(&self, count: usize) {
        self.state.borrow_mut().nacks_pending = count;
    }
}

impl i2c::ErrorType for SimPotentiometer {
    type Error = SimBusError;
}

impl I2c for SimPotentiometer {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>]
    ) -> Result<(), Self::Error> {

        let mut state = self.state.borrow_mut();
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    if state.nacks_pending > 0 {
                        state.nacks_pending -= 1;
                        return Err(SimBusError::Nack);
                    }
                    if let &[_, value] = *bytes {
                        state.wiper = value;
                    }
                    record(&mut state.writes, (address, bytes.to_vec()));
                },
                Operation::Read(buffer) => {
                    state.reads += 1;
                    buffer.fill(state.wiper);
                },
            }
        }

        Ok(())
    }
}

struct LineState {
    high: bool,
    history: VecDeque<bool>,
    toggles: usize,
    drives: usize,
    fail_at: Option<usize>,
}

/// An output line that remembers the levels it has recently been driven to.
#[derive(Clone)]
pub struct SimLine {
    state: Rc<RefCell<LineState>>,
}

impl SimLine {

    /// Creates a new line, starting low.
    pub fn new() -> Self {
        SimLine {
            state: Rc::new(RefCell::new(LineState {
                high: false,
                history: VecDeque::new(),
                toggles: 0,
                drives: 0,
                fail_at: None,
            })),
        }
    }

    pub fn is_high(&self) -> bool {
        self.state.borrow().high
    }

    /// Recent levels the line has been driven to, oldest first.
    pub fn history(&self) -> Vec<bool> {
        self.state.borrow().history.iter().copied().collect()
    }

    pub fn toggles(&self) -> usize {
        self.state.borrow().toggles
    }

    /// Makes a single future drive fail, leaving the level alone. Zero is the
    /// next drive, one the drive after it, and so on.
    pub fn fail_drive(&self, after: usize) {
        let mut state = self.state.borrow_mut();
        state.fail_at = Some(state.drives + after);
    }

    fn drive(&mut self, high: bool) -> Result<(), SimLineError> {
        let mut state = self.state.borrow_mut();
        let drive = state.drives;
        state.drives += 1;
        if state.fail_at == Some(drive) {
            state.fail_at = None;
            return Err(SimLineError::Stuck);
        }
        state.high = high;
        record(&mut state.history, high);
        Ok(())
    }
}

impl digital::ErrorType for SimLine {
    type Error = SimLineError;
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

impl StatefulOutputPin for SimLine {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().high)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        let high = !self.state.borrow().high;
        self.drive(high)?;
        self.state.borrow_mut().toggles += 1;
        Ok(())
    }
}

struct LinkState {
    pending: VecDeque<u8>,
    clocked_in: usize,
    clocked_out: VecDeque<u8>,
}

/// The receiving end of the observation link. Bytes queued with `feed` are
/// delivered in order; clocking a byte when nothing is queued reports a stall.
#[derive(Clone)]
pub struct SimLink {
    state: Rc<RefCell<LinkState>>,
}

impl SimLink {

    /// Creates a new link with nothing queued.
    pub fn new() -> Self {
        SimLink {
            state: Rc::new(RefCell::new(LinkState {
                pending: VecDeque::new(),
                clocked_in: 0,
                clocked_out: VecDeque::new(),
            })),
        }
    }

    /// Queues bytes for delivery.
    pub fn feed(&self, bytes: &[u8]) {
        self.state.borrow_mut().pending.extend(bytes.iter().copied());
    }

    /// Bytes still waiting to be clocked in.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Total bytes successfully clocked in.
    pub fn clocked_in(&self) -> usize {
        self.state.borrow().clocked_in
    }

    /// Recent bytes the receiver clocked out while reading, oldest first.
    pub fn clocked_out(&self) -> Vec<u8> {
        self.state.borrow().clocked_out.iter().copied().collect()
    }

    fn exchange(&mut self, outgoing: u8) -> Result<u8, SimLinkError> {
        let mut state = self.state.borrow_mut();
        record(&mut state.clocked_out, outgoing);
        let incoming = state.pending.pop_front().ok_or(SimLinkError::Stalled)?;
        state.clocked_in += 1;
        Ok(incoming)
    }
}

impl spi::ErrorType for SimLink {
    type Error = SimLinkError;
}

impl SpiBus<u8> for SimLink {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(0x00)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.exchange(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for index in 0..read.len().max(write.len()) {
            let incoming = self.exchange(write.get(index).copied().unwrap_or(0x00))?;
            if let Some(word) = read.get_mut(index) {
                *word = incoming;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A clock that never actually sleeps, it just adds up what it was asked for.
#[derive(Clone)]
pub struct SimClock {
    elapsed_ns: Rc<RefCell<u64>>,
}

impl SimClock {

    /// Creates a new clock at zero.
    pub fn new() -> Self {
        SimClock {
            elapsed_ns: Rc::new(RefCell::new(0)),
        }
    }

    pub fn elapsed_ns(&self) -> u64 {
        *self.elapsed_ns.borrow()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns() / 1_000_000
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        *self.elapsed_ns.borrow_mut() += ns as u64;
    }

    fn delay_us(&mut self, us: u32) {
        *self.elapsed_ns.borrow_mut() += us as u64 * 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        *self.elapsed_ns.borrow_mut() += ms as u64 * 1_000_000;
    }
}
