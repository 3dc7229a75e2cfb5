//! Blocking byte transport over a non-blocking serial link
//!
//! There is no receive timeout. While the link has nothing, the transport
//! keeps polling the supervisor; on silicon the watchdog resets the core long
//! before that poll ever says yes.

use crate::hal::watchdog::{Expiry, WatchdogTimeout};
use crate::logger::{Event, Trace};
use crate::supervisor::Supervisor;
use embedded_hal::serial::{Read, Write};
use embedded_hal::watchdog::{Watchdog, WatchdogEnable};

pub use crate::hal::LinkError;

/// Why a session stopped waiting. Only the watchdog ends a wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stall {
    /// Expired while waiting for the host
    HostSilent,
    /// Expired in the trap after a bad end-of-packet byte
    Desync,
}

pub struct Transport<L> {
    link: L,
}

impl<L> Transport<L>
where
    L: Read<u8> + Write<u8>,
    <L as Read<u8>>::Error: Into<LinkError>,
{
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Blocks for the next byte.
    ///
    /// A clean byte services the supervisor. A byte with a framing error is
    /// handed over as-is but does not, so a noisy line cannot keep the
    /// session alive.
    pub fn receive<W, T>(&mut self, supervisor: &mut Supervisor<W>, trace: &mut T) -> Result<u8, Stall>
    where
        W: WatchdogEnable<Time = WatchdogTimeout> + Watchdog + Expiry,
        T: Trace,
    {
        loop {
            match self.link.read() {
                Ok(byte) => {
                    supervisor.service();
                    return Ok(byte);
                }
                Err(nb::Error::Other(error)) => match error.into() {
                    LinkError::Framing(byte) => {
                        trace.record(Event::FramingError(byte));
                        return Ok(byte);
                    }
                    LinkError::Line => trace.record(Event::LineFault),
                },
                Err(nb::Error::WouldBlock) => {}
            }
            if supervisor.expired() {
                trace.record(Event::Expired);
                return Err(Stall::HostSilent);
            }
        }
    }

    /// Reads and throws away `count` bytes.
    pub fn skip<W, T>(&mut self, count: usize, supervisor: &mut Supervisor<W>, trace: &mut T) -> Result<(), Stall>
    where
        W: WatchdogEnable<Time = WatchdogTimeout> + Watchdog + Expiry,
        T: Trace,
    {
        for _ in 0..count {
            self.receive(supervisor, trace)?;
        }
        Ok(())
    }

    /// Blocks until the byte is queued. Transmit faults are not reported;
    /// the host will notice the gap and resynchronise.
    pub fn send(&mut self, byte: u8) {
        nb::block!(self.link.write(byte)).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTrace, Rx, SimLink, SimWatchdog};

    fn supervisor() -> Supervisor<SimWatchdog> {
        Supervisor::start(SimWatchdog::new(), WatchdogTimeout::Ms16)
    }

    #[test]
    fn clean_byte_services_supervisor() {
        let mut transport = Transport::new(SimLink::with_input(&[0x30]));
        let mut supervisor = supervisor();
        let mut trace = RecordingTrace::default();

        assert_eq!(transport.receive(&mut supervisor, &mut trace), Ok(0x30));
        assert_eq!(supervisor.watchdog().feeds(), 1);
        assert!(trace.events.is_empty());
    }

    #[test]
    fn framing_error_byte_is_returned_unserviced() {
        let mut link = SimLink::new();
        link.inject(Rx::Framing(0x7E));
        let mut transport = Transport::new(link);
        let mut supervisor = supervisor();
        let mut trace = RecordingTrace::default();

        assert_eq!(transport.receive(&mut supervisor, &mut trace), Ok(0x7E));
        assert_eq!(supervisor.watchdog().feeds(), 0);
        assert_eq!(trace.events, [Event::FramingError(0x7E)]);
    }

    #[test]
    fn line_fault_keeps_waiting() {
        let mut link = SimLink::new();
        link.inject(Rx::Line);
        link.feed(&[0x55]);
        let mut transport = Transport::new(link);
        let mut supervisor = supervisor();
        let mut trace = RecordingTrace::default();

        assert_eq!(transport.receive(&mut supervisor, &mut trace), Ok(0x55));
        assert_eq!(trace.events, [Event::LineFault]);
    }

    #[test]
    fn silence_ends_in_stall() {
        let mut transport = Transport::new(SimLink::new());
        let mut supervisor = supervisor();
        let mut trace = RecordingTrace::default();

        assert_eq!(transport.receive(&mut supervisor, &mut trace), Err(Stall::HostSilent));
        assert_eq!(transport.link().idle_polls(), 16);
        assert_eq!(trace.events, [Event::Expired]);
    }

    #[test]
    fn skip_consumes_exact_count() {
        let mut transport = Transport::new(SimLink::with_input(&[1, 2, 3, 4]));
        let mut supervisor = supervisor();

        transport.skip(3, &mut supervisor, &mut ()).unwrap();
        assert_eq!(transport.link().pending(), 1);
    }
}
