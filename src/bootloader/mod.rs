//! Command processor
//!
//! One state only: waiting for a command byte. Each [`Bootloader::step`] is a
//! full exchange (command, parameters, end-of-packet check, reply) and reports
//! what the watchdog would have done to the core, as an [`Outcome`].

pub mod erase;

use crate::config::{
    DESYNC_TIMEOUT, EXIT_TIMEOUT, EXTENDED_ADDRESSING, SIGNATURE, VERSION_MAJOR, VERSION_MINOR,
};
use crate::hal::nvm::NvmController;
use crate::hal::watchdog::{Expiry, WatchdogTimeout};
use crate::logger::{Event, Trace};
use crate::memory::{Address, MemoryEngine, PageBuffer, Target};
use crate::protocol::packet::{self, PageRequest};
use crate::protocol::transport::{LinkError, Stall, Transport};
use crate::protocol::*;
use crate::supervisor::Supervisor;
use embedded_hal::serial::{Read, Write};
use embedded_hal::watchdog::{Watchdog, WatchdogEnable};
use erase::EraseMap;

/// Result of one exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Exchange completed, wait for the next command
    ContinueSession,
    /// Watchdog ran out while waiting for the host
    HandToApplication,
    /// Watchdog ran out in the trap after a bad end-of-packet byte
    FatalRestart,
}

impl From<Stall> for Outcome {
    fn from(stall: Stall) -> Self {
        match stall {
            Stall::HostSilent => Outcome::HandToApplication,
            Stall::Desync => Outcome::FatalRestart,
        }
    }
}

pub struct Bootloader<L, N, W, T = ()> {
    transport: Transport<L>,
    memory: MemoryEngine<N>,
    supervisor: Supervisor<W>,
    trace: T,
    cursor: Address,
    page: PageBuffer,
    erased: EraseMap,
    extended_addressing: bool,
}

impl<L, N, W> Bootloader<L, N, W, ()>
where
    L: Read<u8> + Write<u8>,
    <L as Read<u8>>::Error: Into<LinkError>,
    N: NvmController,
    W: WatchdogEnable<Time = WatchdogTimeout> + Watchdog + Expiry,
{
    /// Fresh session state: cursor at zero, no group erased yet.
    pub fn new(link: L, memory: MemoryEngine<N>, supervisor: Supervisor<W>) -> Self {
        Self {
            transport: Transport::new(link),
            memory,
            supervisor,
            trace: (),
            cursor: Address::ZERO,
            page: PageBuffer::new(),
            erased: EraseMap::new(),
            extended_addressing: EXTENDED_ADDRESSING,
        }
    }
}

impl<L, N, W, T> Bootloader<L, N, W, T>
where
    L: Read<u8> + Write<u8>,
    <L as Read<u8>>::Error: Into<LinkError>,
    N: NvmController,
    W: WatchdogEnable<Time = WatchdogTimeout> + Watchdog + Expiry,
    T: Trace,
{
    pub fn with_trace<U: Trace>(self, trace: U) -> Bootloader<L, N, W, U> {
        Bootloader {
            transport: self.transport,
            memory: self.memory,
            supervisor: self.supervisor,
            trace,
            cursor: self.cursor,
            page: self.page,
            erased: self.erased,
            extended_addressing: self.extended_addressing,
        }
    }

    pub fn with_extended_addressing(mut self, enabled: bool) -> Self {
        self.extended_addressing = enabled;
        self
    }

    /// Serves commands until the watchdog ends the session.
    pub fn run(&mut self) -> Outcome {
        loop {
            match self.step() {
                Outcome::ContinueSession => {}
                outcome => return outcome,
            }
        }
    }

    pub fn step(&mut self) -> Outcome {
        match self.exchange() {
            Ok(()) => Outcome::ContinueSession,
            Err(stall) => stall.into(),
        }
    }

    pub fn link(&self) -> &L {
        self.transport.link()
    }

    pub fn memory(&self) -> &MemoryEngine<N> {
        &self.memory
    }

    pub fn supervisor(&self) -> &Supervisor<W> {
        &self.supervisor
    }

    pub fn trace(&self) -> &T {
        &self.trace
    }

    pub fn cursor(&self) -> Address {
        self.cursor
    }

    pub fn erase_map(&self) -> EraseMap {
        self.erased
    }

    fn exchange(&mut self) -> Result<(), Stall> {
        let opcode = self.receive()?;
        self.trace.record(Event::Command(opcode));

        match Command::parse(opcode) {
            Some(Command::GetParameter) => {
                let value = match self.receive()? {
                    PARAM_SW_MAJOR => VERSION_MAJOR,
                    PARAM_SW_MINOR => VERSION_MINOR,
                    _ => PARAM_GENERIC,
                };
                self.verify_eop()?;
                self.transport.send(value);
            }
            Some(Command::SetDevice) => {
                self.skip(SET_DEVICE_LEN)?;
                self.verify_eop()?;
            }
            Some(Command::SetDeviceExt) => {
                self.skip(SET_DEVICE_EXT_LEN)?;
                self.verify_eop()?;
            }
            Some(Command::LoadAddress) => {
                let lo = self.receive()?;
                let hi = self.receive()?;
                self.cursor = packet::load_address(lo, hi, self.extended_addressing);
                self.verify_eop()?;
            }
            Some(Command::Universal) => {
                self.skip(UNIVERSAL_LEN)?;
                self.verify_eop()?;
                self.transport.send(0x00);
            }
            Some(Command::ProgPage) => self.program_page()?,
            Some(Command::ReadPage) => self.read_page()?,
            Some(Command::ReadSign) => {
                self.verify_eop()?;
                for byte in SIGNATURE {
                    self.transport.send(byte);
                }
            }
            Some(Command::LeaveProgmode) => {
                // The host hangs up after this reply; the short countdown starts the app
                self.supervisor.arm(EXIT_TIMEOUT);
                self.verify_eop()?;
            }
            None => self.verify_eop()?,
        }

        self.transport.send(STK_OK);
        Ok(())
    }

    fn program_page(&mut self) -> Result<(), Stall> {
        let request = self.page_request()?;

        self.page.clear();
        for _ in 0..request.length {
            let byte = self.receive()?;
            self.page.stage(byte);
        }

        // Nothing staged, nothing to erase or program; the reply is still framed
        if request.length == 0 {
            return self.verify_eop();
        }

        // Erase overlaps the end-of-packet round trip
        if request.tag == TAG_FLASH {
            let group = self.cursor.group();
            if self.erased.needs_erase(group) {
                self.erased.mark(group);
                self.memory.erase_group(group);
                self.trace.record(Event::GroupErased(group));
            }
        }

        self.verify_eop()?;

        let target = request.target();
        self.memory.write_page(&mut self.cursor, &mut self.page, target);
        if target == Target::Flash {
            self.trace.record(Event::PageProgrammed(self.cursor.byte()));
        }
        Ok(())
    }

    fn read_page(&mut self) -> Result<(), Stall> {
        let request = self.page_request()?;
        self.verify_eop()?;

        let transport = &mut self.transport;
        self.memory
            .read_page_or_bytes(&mut self.cursor, request.length, request.target(), |byte| {
                transport.send(byte)
            });
        Ok(())
    }

    fn page_request(&mut self) -> Result<PageRequest, Stall> {
        let header = [self.receive()?, self.receive()?, self.receive()?];
        Ok(PageRequest::parse(header))
    }

    /// Checks the end-of-packet byte and opens the reply.
    ///
    /// On a mismatch nothing is sent. The watchdog is cut to its shortest
    /// period and left to run out, so a confused host sees the device reset
    /// instead of a half-understood reply.
    fn verify_eop(&mut self) -> Result<(), Stall> {
        let byte = self.receive()?;
        if byte != CRC_EOP {
            self.trace.record(Event::Desync(byte));
            self.supervisor.arm(DESYNC_TIMEOUT);
            while !self.supervisor.expired() {}
            return Err(Stall::Desync);
        }
        self.supervisor.service();
        self.transport.send(STK_INSYNC);
        Ok(())
    }

    #[inline]
    fn receive(&mut self) -> Result<u8, Stall> {
        self.transport.receive(&mut self.supervisor, &mut self.trace)
    }

    fn skip(&mut self, count: usize) -> Result<(), Stall> {
        self.transport.skip(count, &mut self.supervisor, &mut self.trace)
    }
}
