//! Virtual boot partition: reset vector relocation for page zero

use crate::config::{PAGE_SIZE, RESET_VECTOR, WATCHDOG_VECTOR};

/// Encodes `jmp` to a byte address as it sits in flash (little-endian words).
pub const fn jmp(byte_address: u16) -> [u8; 4] {
    let word = byte_address >> 1;
    [0x0C, 0x94, word as u8, (word >> 8) as u8]
}

/// The application's own reset and watchdog vectors, as the host sent them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorShadow {
    reset: [u16; 2],
    watchdog: [u16; 2],
}

fn pair(bytes: &[u8]) -> [u16; 2] {
    [
        u16::from_le_bytes([bytes[0], bytes[1]]),
        u16::from_le_bytes([bytes[2], bytes[3]]),
    ]
}

impl VectorShadow {
    /// Captures the original vectors and rewrites the page so reset lands in
    /// the bootloader while the real entry moves to the watchdog vector.
    pub fn patch(page: &mut [u8; PAGE_SIZE], entry: [u8; 4]) -> Self {
        let shadow = Self {
            reset: pair(&page[RESET_VECTOR..RESET_VECTOR + 4]),
            watchdog: pair(&page[WATCHDOG_VECTOR..WATCHDOG_VECTOR + 4]),
        };

        page.copy_within(RESET_VECTOR..RESET_VECTOR + 4, WATCHDOG_VECTOR);
        page[RESET_VECTOR..RESET_VECTOR + 4].copy_from_slice(&entry);
        shadow
    }

    /// The byte a verifying host expects at `offset`, if that offset was
    /// rewritten by [`VectorShadow::patch`].
    pub fn original(&self, offset: u32) -> Option<u8> {
        let (words, at) = match offset as usize {
            o if (RESET_VECTOR..RESET_VECTOR + 4).contains(&o) => (&self.reset, o - RESET_VECTOR),
            o if (WATCHDOG_VECTOR..WATCHDOG_VECTOR + 4).contains(&o) => (&self.watchdog, o - WATCHDOG_VECTOR),
            _ => return None,
        };
        let word = words[at / 2];
        Some(if at % 2 == 0 { word as u8 } else { (word >> 8) as u8 })
    }
}
