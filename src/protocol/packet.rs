//! Fixed parameter blocks of the programming commands

use super::TAG_EEPROM;
use crate::memory::{Address, Target};

/// LOAD_ADDRESS payload: little-endian word address.
pub fn load_address(lo: u8, hi: u8, extension: bool) -> Address {
    Address::from_word(u16::from_le_bytes([lo, hi]), extension)
}

/// Header shared by PROG_PAGE and READ_PAGE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub length: u16,
    pub tag: u8,
}

impl PageRequest {
    /// Big-endian length, then the memory type tag.
    pub fn parse(header: [u8; 3]) -> Self {
        Self {
            length: u16::from_be_bytes([header[0], header[1]]),
            tag: header[2],
        }
    }

    /// Anything not tagged EEPROM goes to flash.
    pub fn target(&self) -> Target {
        if self.tag == TAG_EEPROM {
            Target::Eeprom
        } else {
            Target::Flash
        }
    }
}
