//! Reset-cause dispatch
//!
//! Decides, once per reset, whether the application starts straight away or
//! the host gets a programming session first.

use crate::bootloader::Outcome;
use crate::hal::reset::{ResetFlags, ResetSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Application,
    Session,
}

/// How control leaves the bootloader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// Start the application right away, passing it the reset cause
    Application(ResetFlags),
    /// The session ended; wait for the watchdog to reset the core
    Reset(Outcome),
}

/// Watchdog, brown-out and power-on resets go straight to the application.
/// Only an external reset, or none at all (the application jumped here),
/// opens a session.
pub fn decide(flags: ResetFlags) -> Route {
    let skip = ResetFlags::WATCHDOG | ResetFlags::BROWN_OUT | ResetFlags::POWER_ON;
    if flags.intersects(skip) {
        Route::Application
    } else {
        Route::Session
    }
}

/// Reads the reset cause once and either hands over or runs `session`.
pub fn boot<R, S>(reset: &mut R, session: S) -> Handoff
where
    R: ResetSource,
    S: FnOnce() -> Outcome,
{
    let flags = reset.take();
    match decide(flags) {
        Route::Application => Handoff::Application(flags),
        Route::Session => Handoff::Reset(session()),
    }
}
