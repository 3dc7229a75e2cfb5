//! Hand-off into the resident application

use super::reset::ResetFlags;
use super::watchdog::Watchdog;
use embedded_hal::watchdog::WatchdogDisable;

/// Word address of the application's reset vector.
pub const RESET_VECTOR_WORD: u16 = 0x0000;

/// Word address of the watchdog vector, where the real application entry
/// lives once page zero has been patched for the virtual boot partition.
pub const WATCHDOG_VECTOR_WORD: u16 = 0x000C;

/// Jumps to the application, leaving the reset cause in `r2`.
///
/// The application can recover the flags by saving `r2` from code placed in
/// `.init0`, before the C runtime clobbers it.
///
/// # Safety
///
/// `entry` must be a valid word address holding application code.
pub unsafe fn start_application(flags: ResetFlags, entry: u16) -> ! {
    Watchdog::new().disable();
    core::arch::asm!(
        "ijmp",
        in("r2") flags.bits(),
        in("Z") entry,
        options(noreturn)
    );
}
