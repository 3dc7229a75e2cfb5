//! Self-programming controller seam
//!
//! The memory engine only ever talks to [`NvmController`]. The LGT8F adapter
//! drives the E2PROM controller registers, which on these parts also erase
//! and program the flash.

use crate::config::PAGE_SIZE;

pub trait NvmController {
    /// Erases the page group starting at linear flash address `base`.
    fn erase_group(&mut self, base: u32);

    /// Programs one full page at linear flash address `base`.
    fn program_page(&mut self, base: u32, page: &[u8; PAGE_SIZE]);

    fn read_flash(&mut self, address: u32) -> u8;

    fn write_eeprom(&mut self, address: u16, byte: u8);

    fn read_eeprom(&mut self, address: u16) -> u8;
}

#[cfg(target_arch = "avr")]
pub use self::lgt8::Lgt8Nvm;

#[cfg(target_arch = "avr")]
mod lgt8 {
    use super::NvmController;
    use crate::config::PAGE_SIZE;
    use core::ptr::{read_volatile, write_volatile};

    // Data-space addresses of the E2PROM controller
    const EECR: *mut u8 = 0x3F as *mut u8;
    const EEDR: *mut u8 = 0x40 as *mut u8;
    const EEARL: *mut u8 = 0x41 as *mut u8;
    const EEARH: *mut u8 = 0x42 as *mut u8;

    // Flash is mirrored read-only into data space from here
    const FLASH_MIRROR: usize = 0x4000;

    const ERASE_ENABLE: u8 = 0x94;
    const ERASE_START: u8 = 0x92;
    const PROGRAM_ENABLE: u8 = 0xA4;
    const PROGRAM_START: u8 = 0xA2;
    const EEPROM_WRITE_ENABLE: u8 = 0x04;
    const EEPROM_WRITE_START: u8 = 0x02;
    const EEPROM_READ: u8 = 0x01;

    pub struct Lgt8Nvm {
        _private: (),
    }

    impl Lgt8Nvm {
        pub fn new() -> Self {
            Self { _private: () }
        }

        #[inline(always)]
        fn select(&mut self, address: u16) {
            unsafe {
                write_volatile(EEARL, address as u8);
                write_volatile(EEARH, (address >> 8) as u8);
            }
        }

        // Enable and start writes must land back to back
        #[inline(always)]
        fn strobe(&mut self, enable: u8, start: u8) {
            unsafe {
                write_volatile(EECR, enable);
                write_volatile(EECR, start);
            }
        }
    }

    impl Default for Lgt8Nvm {
        fn default() -> Self {
            Self::new()
        }
    }

    impl NvmController for Lgt8Nvm {
        fn erase_group(&mut self, base: u32) {
            self.select(base as u16 & 0xFF00);
            self.strobe(ERASE_ENABLE, ERASE_START);
            avr_device::asm::nop();
            avr_device::asm::nop();
        }

        fn program_page(&mut self, base: u32, page: &[u8; PAGE_SIZE]) {
            let base = base as u16;
            unsafe {
                write_volatile(EEARH, (base >> 8) as u8);
                for (offset, word) in page.chunks_exact(2).enumerate() {
                    // Stage the word through the two low latch addresses
                    write_volatile(EEARL, 0);
                    write_volatile(EEDR, word[0]);
                    write_volatile(EEARL, 1);
                    write_volatile(EEDR, word[1]);
                    write_volatile(EEARL, base.wrapping_add(2 * offset as u16) as u8);
                    self.strobe(PROGRAM_ENABLE, PROGRAM_START);
                }
            }
        }

        fn read_flash(&mut self, address: u32) -> u8 {
            unsafe { read_volatile((FLASH_MIRROR + (address as u16) as usize) as *const u8) }
        }

        fn write_eeprom(&mut self, address: u16, byte: u8) {
            self.select(address);
            unsafe {
                write_volatile(EEDR, byte);
            }
            self.strobe(EEPROM_WRITE_ENABLE, EEPROM_WRITE_START);
        }

        fn read_eeprom(&mut self, address: u16) -> u8 {
            self.select(address);
            unsafe {
                write_volatile(EECR, EEPROM_READ);
                avr_device::asm::nop();
                avr_device::asm::nop();
                read_volatile(EEDR)
            }
        }
    }
}
