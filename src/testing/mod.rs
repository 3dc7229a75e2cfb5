//! In-memory stand-ins for the hardware seams
//!
//! Every fake records what was done to it so tests can assert on side
//! effects. Time is virtual: it only moves when somebody busy-waits.

use crate::config::PAGE_SIZE;
use crate::hal::delay::TickDelay;
use crate::hal::nvm::NvmController;
use crate::hal::reset::{ResetFlags, ResetSource};
use crate::hal::watchdog::{Expiry, WatchdogTimeout};
use crate::hal::LinkError;
use crate::logger::{Event, Trace};
use embedded_hal::{serial, watchdog};
use std::collections::VecDeque;

impl From<embedded_hal_mock::MockError> for LinkError {
    fn from(_: embedded_hal_mock::MockError) -> Self {
        LinkError::Line
    }
}

/// What the host puts on the wire next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rx {
    Byte(u8),
    Framing(u8),
    Line,
}

/// Scripted serial link. Once the script runs dry the line stays idle.
#[derive(Default)]
pub struct SimLink {
    rx: VecDeque<Rx>,
    tx: Vec<u8>,
    reads: usize,
    idle_polls: u64,
}

impl SimLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let mut link = Self::new();
        link.feed(bytes);
        link
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().map(|&b| Rx::Byte(b)));
    }

    pub fn inject(&mut self, rx: Rx) {
        self.rx.push_back(rx);
    }

    pub fn sent(&self) -> &[u8] {
        &self.tx
    }

    /// Scripted input not consumed yet.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Bytes (clean or not) handed to the reader.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn idle_polls(&self) -> u64 {
        self.idle_polls
    }

    /// No byte moved in either direction.
    pub fn untouched(&self) -> bool {
        self.reads == 0 && self.tx.is_empty() && self.idle_polls == 0
    }
}

impl serial::Read<u8> for SimLink {
    type Error = LinkError;

    fn read(&mut self) -> nb::Result<u8, LinkError> {
        let next = match self.rx.pop_front() {
            Some(next) => next,
            None => {
                self.idle_polls += 1;
                return Err(nb::Error::WouldBlock);
            }
        };
        self.reads += 1;
        match next {
            Rx::Byte(byte) => Ok(byte),
            Rx::Framing(byte) => Err(nb::Error::Other(LinkError::Framing(byte))),
            Rx::Line => Err(nb::Error::Other(LinkError::Line)),
        }
    }
}

impl serial::Write<u8> for SimLink {
    type Error = LinkError;

    fn write(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        self.tx.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), LinkError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NvmOp {
    Erase { base: u32 },
    Program { base: u32, data: Vec<u8> },
    EepromWrite { address: u16, byte: u8 },
}

/// Flash and EEPROM backed by vectors. Programming can only clear bits,
/// like the real array, so a missing erase shows up in the contents.
pub struct SimNvm {
    flash: Vec<u8>,
    eeprom: Vec<u8>,
    ops: Vec<NvmOp>,
}

const GROUP_BYTES: usize = 1 << crate::config::GROUP_SHIFT;

impl SimNvm {
    pub fn new() -> Self {
        Self {
            flash: vec![0xFF; 0x2_0000],
            eeprom: vec![0xFF; 0x1_0000],
            ops: Vec::new(),
        }
    }

    /// Preloads flash without recording an operation.
    pub fn load_flash(&mut self, address: u32, bytes: &[u8]) {
        let start = address as usize;
        self.flash[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn flash(&self, address: u32, len: usize) -> Vec<u8> {
        let start = address as usize;
        self.flash[start..start + len].to_vec()
    }

    pub fn eeprom(&self, address: u16, len: usize) -> Vec<u8> {
        let start = address as usize;
        self.eeprom[start..start + len].to_vec()
    }

    pub fn ops(&self) -> &[NvmOp] {
        &self.ops
    }

    pub fn erase_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, NvmOp::Erase { .. })).count()
    }

    pub fn programs(&self) -> Vec<(u32, Vec<u8>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                NvmOp::Program { base, data } => Some((*base, data.clone())),
                _ => None,
            })
            .collect()
    }
}

impl Default for SimNvm {
    fn default() -> Self {
        Self::new()
    }
}

impl NvmController for SimNvm {
    fn erase_group(&mut self, base: u32) {
        let start = base as usize & !(GROUP_BYTES - 1);
        self.flash[start..start + GROUP_BYTES].fill(0xFF);
        self.ops.push(NvmOp::Erase { base });
    }

    fn program_page(&mut self, base: u32, page: &[u8; PAGE_SIZE]) {
        let start = base as usize;
        for (cell, &byte) in self.flash[start..start + PAGE_SIZE].iter_mut().zip(page.iter()) {
            *cell &= byte;
        }
        self.ops.push(NvmOp::Program {
            base,
            data: page.to_vec(),
        });
    }

    fn read_flash(&mut self, address: u32) -> u8 {
        self.flash[address as usize]
    }

    fn write_eeprom(&mut self, address: u16, byte: u8) {
        self.eeprom[address as usize] = byte;
        self.ops.push(NvmOp::EepromWrite { address, byte });
    }

    fn read_eeprom(&mut self, address: u16) -> u8 {
        self.eeprom[address as usize]
    }
}

/// Watchdog on a virtual millisecond clock. Each `expired` poll is one
/// millisecond of busy-waiting.
#[derive(Default)]
pub struct SimWatchdog {
    period: Option<WatchdogTimeout>,
    elapsed_ms: u32,
    feeds: u32,
    arms: Vec<WatchdogTimeout>,
    fired: bool,
}

impl SimWatchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the last start or feed.
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn feeds(&self) -> u32 {
        self.feeds
    }

    pub fn arms(&self) -> &[WatchdogTimeout] {
        &self.arms
    }

    pub fn fired(&self) -> bool {
        self.fired
    }
}

impl watchdog::WatchdogEnable for SimWatchdog {
    type Time = WatchdogTimeout;

    fn start<T: Into<WatchdogTimeout>>(&mut self, period: T) {
        let period = period.into();
        self.period = Some(period);
        self.elapsed_ms = 0;
        self.arms.push(period);
    }
}

impl watchdog::Watchdog for SimWatchdog {
    fn feed(&mut self) {
        self.elapsed_ms = 0;
        self.feeds += 1;
    }
}

impl Expiry for SimWatchdog {
    fn expired(&mut self) -> bool {
        if let (Some(period), false) = (self.period, self.fired) {
            self.elapsed_ms += 1;
            self.fired = self.elapsed_ms >= period.millis();
        }
        self.fired
    }
}

/// Reset cause register that clears on read.
pub struct SimReset {
    flags: ResetFlags,
    reads: u32,
}

impl SimReset {
    pub fn new(flags: ResetFlags) -> Self {
        Self { flags, reads: 0 }
    }

    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl ResetSource for SimReset {
    fn take(&mut self) -> ResetFlags {
        self.reads += 1;
        core::mem::take(&mut self.flags)
    }
}

/// Tick counter standing in for the spin-loop delay.
#[derive(Default)]
pub struct VirtualClock {
    elapsed: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

impl TickDelay for VirtualClock {
    fn delay_ticks(&mut self, ticks: u16) {
        self.elapsed += ticks as u64;
    }
}

/// Keeps every traced event.
#[derive(Default)]
pub struct RecordingTrace {
    pub events: Vec<Event>,
}

impl Trace for RecordingTrace {
    fn record(&mut self, event: Event) {
        self.events.push(event);
    }
}
