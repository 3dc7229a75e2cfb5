//! Event tracing for the bootloader
//!
//! The protocol link is never used for diagnostics. Boards that have a spare
//! output can plug a [`Console`] in; the firmware image uses the silent `()`
//! sink, which compiles away.

use ufmt::derive::uDebug;
use ufmt::{uWrite, uwriteln};

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum Event {
    /// Command byte taken off the wire
    Command(u8),
    /// Byte received with a framing error; the watchdog was not fed
    FramingError(u8),
    /// Link driver fault without a byte
    LineFault,
    /// Page group erased, by index
    GroupErased(u8),
    /// Flash page programmed, by byte address
    PageProgrammed(u16),
    /// Wrong end-of-packet byte
    Desync(u8),
    /// Watchdog ran out while the bootloader was waiting
    Expired,
}

pub trait Trace {
    fn record(&mut self, event: Event);
}

impl Trace for () {
    #[inline(always)]
    fn record(&mut self, _event: Event) {}
}

/// Writes one `[boot] <event>` line per event.
pub struct Console<W> {
    out: W,
}

impl<W: uWrite> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: uWrite> Trace for Console<W> {
    fn record(&mut self, event: Event) {
        uwriteln!(self.out, "[boot] {:?}", event).ok();
    }
}
