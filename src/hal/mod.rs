pub mod delay;
pub mod nvm;
pub mod reset;
pub mod soft_uart;
pub mod watchdog;

#[cfg(target_arch = "avr")]
pub mod boot;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod uart;

// Re-export commonly used types
pub use delay::{SpinDelay, TickDelay};
pub use nvm::NvmController;
pub use reset::{ResetFlags, ResetSource};
pub use soft_uart::SoftUart;
pub use watchdog::{Expiry, WatchdogTimeout};

#[cfg(target_arch = "avr")]
pub use nvm::Lgt8Nvm;
#[cfg(target_arch = "avr")]
pub use reset::McuStatus;
#[cfg(target_arch = "avr")]
pub use uart::Usart0;
#[cfg(target_arch = "avr")]
pub use watchdog::Watchdog;

/// Fault reported by a serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// A byte arrived with a bad stop bit. It is still handed over.
    Framing(u8),
    /// The line driver itself failed; no byte was received.
    Line,
}
