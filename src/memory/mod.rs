//! Flash and EEPROM programming engine
//!
//! Sits between the command processor and the [`NvmController`] seam. It owns
//! the vector shadow used by the virtual boot partition, nothing else: the
//! cursor and the page buffer are lent to it per call.

pub mod vectors;

use crate::config::{BOOT_START, GROUP_SHIFT, PAGE_SIZE};
use crate::hal::nvm::NvmController;
use vectors::{jmp, VectorShadow};

/// Address cursor: 16-bit byte address plus the extension bit for parts
/// with more than 64 KiB of flash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Address {
    byte: u16,
    extended: bool,
}

impl Address {
    pub const ZERO: Self = Self::new(0, false);

    pub const fn new(byte: u16, extended: bool) -> Self {
        Self { byte, extended }
    }

    /// Converts the word address sent by LOAD_ADDRESS. Bit 15 of the word
    /// selects the upper 64 KiB when `extension` is supported.
    pub const fn from_word(word: u16, extension: bool) -> Self {
        Self {
            byte: word.wrapping_add(word),
            extended: extension && word & 0x8000 != 0,
        }
    }

    pub const fn byte(self) -> u16 {
        self.byte
    }

    pub const fn extended(self) -> bool {
        self.extended
    }

    pub const fn linear(self) -> u32 {
        ((self.extended as u32) << 16) | self.byte as u32
    }

    /// Erase group the cursor points into, counted across both banks.
    pub const fn group(self) -> u8 {
        (self.linear() >> GROUP_SHIFT) as u8
    }

    /// Steps to the next byte. Wraps inside the current 64 KiB bank.
    #[inline]
    pub fn advance(&mut self) {
        self.byte = self.byte.wrapping_add(1);
    }
}

/// One flash page worth of staging RAM.
pub struct PageBuffer {
    data: [u8; PAGE_SIZE],
    staged: usize,
}

impl PageBuffer {
    /// Value of erased flash, used to pad partial pages
    pub const ERASED: u8 = 0xFF;

    pub const fn new() -> Self {
        Self {
            data: [Self::ERASED; PAGE_SIZE],
            staged: 0,
        }
    }

    pub fn clear(&mut self) {
        self.data = [Self::ERASED; PAGE_SIZE];
        self.staged = 0;
    }

    /// Appends a byte; returns `false` once the page is full.
    pub fn stage(&mut self, byte: u8) -> bool {
        match self.data.get_mut(self.staged) {
            Some(slot) => {
                *slot = byte;
                self.staged += 1;
                true
            }
            None => false,
        }
    }

    pub fn staged(&self) -> &[u8] {
        &self.data[..self.staged]
    }

    pub fn page(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    pub fn page_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }
}

impl Default for PageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Flash,
    Eeprom,
}

pub struct MemoryEngine<N> {
    nvm: N,
    virtual_boot: bool,
    shadow: Option<VectorShadow>,
}

impl<N: NvmController> MemoryEngine<N> {
    pub fn new(nvm: N, virtual_boot: bool) -> Self {
        Self {
            nvm,
            virtual_boot,
            shadow: None,
        }
    }

    pub fn nvm(&self) -> &N {
        &self.nvm
    }

    pub fn shadow(&self) -> Option<&VectorShadow> {
        self.shadow.as_ref()
    }

    /// Erases one page group. Irreversible; callers gate this on the
    /// erase bitmap so it runs at most once per group and power cycle.
    pub fn erase_group(&mut self, group: u8) {
        self.nvm.erase_group((group as u32) << GROUP_SHIFT);
    }

    /// Programs the page buffer at the cursor.
    ///
    /// Flash takes the whole page and leaves the cursor alone. EEPROM takes
    /// only the staged bytes and advances the cursor past them.
    pub fn write_page(&mut self, cursor: &mut Address, page: &mut PageBuffer, target: Target) {
        match target {
            Target::Flash => {
                if self.virtual_boot && cursor.linear() == 0 {
                    self.shadow = Some(VectorShadow::patch(page.page_mut(), jmp(BOOT_START)));
                }
                self.nvm.program_page(cursor.linear(), page.page());
            }
            Target::Eeprom => {
                for &byte in page.staged() {
                    self.write_secondary(cursor.byte(), byte);
                    cursor.advance();
                }
            }
        }
    }

    /// Streams `length` bytes starting at the cursor into `emit`.
    pub fn read_page_or_bytes<F>(&mut self, cursor: &mut Address, length: u16, target: Target, mut emit: F)
    where
        F: FnMut(u8),
    {
        for _ in 0..length {
            let byte = match target {
                Target::Flash => self.read_flash(*cursor),
                Target::Eeprom => self.read_secondary(cursor.byte()),
            };
            cursor.advance();
            emit(byte);
        }
    }

    pub fn write_secondary(&mut self, address: u16, byte: u8) {
        self.nvm.write_eeprom(address, byte);
    }

    pub fn read_secondary(&mut self, address: u16) -> u8 {
        self.nvm.read_eeprom(address)
    }

    // Verification must see the image the host sent, not the patched one
    fn read_flash(&mut self, address: Address) -> u8 {
        let original = match (&self.shadow, self.virtual_boot) {
            (Some(shadow), true) => shadow.original(address.linear()),
            _ => None,
        };
        match original {
            Some(byte) => byte,
            None => self.nvm.read_flash(address.linear()),
        }
    }
}
