//! Resident serial bootloader for LGT8Fx8E and ATmega328-class parts.
//!
//! The hardware-independent core (command processor, programming engine,
//! transport, supervisor and entry dispatch) builds and tests on the host.
//! Register-level adapters under [`hal`] only exist for AVR targets.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod bootloader;
pub mod config;
pub mod entry;
pub mod hal;
pub mod logger;
pub mod memory;
pub mod protocol;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use bootloader::{Bootloader, Outcome};
pub use entry::{boot, Handoff};
