//! Configuration constants for the bootloader
//!
//! Frequency, baud rate, timeout and load address come from `build.rs`
//! (overridable through the environment); everything else is fixed by the
//! target part.

use crate::hal::watchdog::WatchdogTimeout;

const fn parse(raw: &str) -> u32 {
    let bytes = raw.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "build setting is not a decimal number");
        value = value * 10 + (digit - b'0') as u32;
        i += 1;
    }
    value
}

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = parse(env!("BOOT_CPU_FREQ_HZ"));

/// Serial link baud rate
pub const BAUD_RATE: u32 = parse(env!("BOOT_BAUD_RATE"));

/// First byte address of the bootloader
pub const BOOT_START: u16 = {
    let start = parse(env!("BOOT_START"));
    assert!(start < 0x1_0000, "BOOT_START must sit in the first 64 KiB");
    start as u16
};

/// Watchdog period while a programming session is active
pub const SESSION_TIMEOUT: WatchdogTimeout = match WatchdogTimeout::from_millis(parse(env!("BOOT_TIMEOUT_MS"))) {
    Some(timeout) => timeout,
    None => panic!("BOOT_TIMEOUT_MS must be one of 500, 1000, 2000, 4000, 8000"),
};

/// Watchdog period after the host leaves programming mode
pub const EXIT_TIMEOUT: WatchdogTimeout = WatchdogTimeout::Ms16;

/// Watchdog period after a lost end-of-packet sentinel
pub const DESYNC_TIMEOUT: WatchdogTimeout = WatchdogTimeout::Ms16;

/// USART divisor, double speed mode, rounded to nearest
pub const UBRR: u16 = {
    let ubrr = (CPU_FREQ_HZ + BAUD_RATE * 4) / (BAUD_RATE * 8) - 1;
    assert!(ubrr >= 3, "baud rate too fast for the USART");
    assert!(ubrr <= 250, "baud rate too slow for the USART");
    ubrr as u16
};

/// Baud rate actually produced by `UBRR`, and its error in per mille
pub const BAUD_ACTUAL: u32 = CPU_FREQ_HZ / (8 * (UBRR as u32 + 1));
pub const BAUD_ERROR_PERMILLE: i32 = {
    let error = 1000 * (BAUD_RATE as i32 - BAUD_ACTUAL as i32) / BAUD_RATE as i32;
    assert!(error > -50 && error < 50, "BAUD_RATE error greater than 5%");
    error
};

/// Half a bit period in spin-loop ticks for the soft UART
pub const SOFT_UART_HALF_BIT: u16 = {
    let ticks = (CPU_FREQ_HZ / BAUD_RATE - 20) / 6;
    assert!(ticks <= 255, "baud rate too slow for the soft UART");
    ticks as u16
};

/// Flash page size in bytes
pub const PAGE_SIZE: usize = 128;

/// Erase granularity: one group is `1 << GROUP_SHIFT` bytes
pub const GROUP_SHIFT: u8 = 10;

/// Byte offsets of the reset and watchdog vectors in page zero
pub const RESET_VECTOR: usize = 0;
pub const WATCHDOG_VECTOR: usize = 24;

/// Device signature reported by READ_SIGN
pub const SIGNATURE: [u8; 3] = [0x1E, 0x95, 0x0F];

/// Firmware version reported by GET_PARAMETER
pub const VERSION_MAJOR: u8 = 5;
pub const VERSION_MINOR: u8 = 0;

/// Honour the extension bit of LOAD_ADDRESS
pub const EXTENDED_ADDRESSING: bool = cfg!(feature = "extended-address");

/// Patch page zero so the bootloader owns the reset vector
pub const VIRTUAL_BOOT_PARTITION: bool = cfg!(feature = "virtual-boot-partition");
