#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use lgt8fx_boot::{
    boot,
    config::{SESSION_TIMEOUT, VIRTUAL_BOOT_PARTITION},
    hal::boot::{start_application, RESET_VECTOR_WORD, WATCHDOG_VECTOR_WORD},
    hal::{Lgt8Nvm, McuStatus, Watchdog},
    memory::MemoryEngine,
    supervisor::Supervisor,
    Bootloader, Handoff, Outcome,
};

#[cfg(all(target_arch = "avr", not(feature = "soft-uart")))]
fn link() -> lgt8fx_boot::hal::Usart0 {
    lgt8fx_boot::hal::Usart0::new()
}

#[cfg(all(target_arch = "avr", feature = "soft-uart"))]
fn link() -> lgt8fx_boot::hal::SoftUart<
    lgt8fx_boot::hal::gpio::board::SoftTx,
    lgt8fx_boot::hal::gpio::board::SoftRx,
    lgt8fx_boot::hal::SpinDelay,
> {
    use lgt8fx_boot::config::SOFT_UART_HALF_BIT;
    use lgt8fx_boot::hal::{gpio::board, SoftUart, SpinDelay};

    let (tx, rx) = board::soft_uart_pins();
    SoftUart::new(tx, rx, SpinDelay::new(), SOFT_UART_HALF_BIT)
}

#[cfg(target_arch = "avr")]
fn session() -> Outcome {
    let supervisor = Supervisor::start(Watchdog::new(), SESSION_TIMEOUT);
    let memory = MemoryEngine::new(Lgt8Nvm::new(), VIRTUAL_BOOT_PARTITION);
    Bootloader::new(link(), memory, supervisor).run()
}

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    match boot(&mut McuStatus::new(), session) {
        Handoff::Application(flags) => {
            let entry = if VIRTUAL_BOOT_PARTITION {
                WATCHDOG_VECTOR_WORD
            } else {
                RESET_VECTOR_WORD
            };
            unsafe { start_application(flags, entry) }
        }
        // Still counting down; the watchdog reset brings us back here
        #[allow(clippy::empty_loop)]
        Handoff::Reset(_) => loop {},
    }
}

// Host builds only need the library
#[cfg(not(target_arch = "avr"))]
fn main() {}
