//! STK500 subset spoken to the host
//!
//! Every request ends with [`CRC_EOP`]. Every accepted request is answered
//! with [`STK_INSYNC`], an optional payload and [`STK_OK`]. There is no
//! negative reply: a request the bootloader cannot make sense of simply never
//! gets one.

pub mod packet;
pub mod transport;

/// End-of-packet sentinel
pub const CRC_EOP: u8 = 0x20;

/// Reply framing
pub const STK_OK: u8 = 0x10;
pub const STK_INSYNC: u8 = 0x14;

/// GET_PARAMETER ids with a real answer
pub const PARAM_SW_MAJOR: u8 = 0x81;
pub const PARAM_SW_MINOR: u8 = 0x82;

/// Answer for every other GET_PARAMETER id
pub const PARAM_GENERIC: u8 = 0x03;

/// Memory type tags in PROG_PAGE / READ_PAGE
pub const TAG_FLASH: u8 = b'F';
pub const TAG_EEPROM: u8 = b'E';

/// Parameter block sizes of the ignored commands
pub const SET_DEVICE_LEN: usize = 20;
pub const SET_DEVICE_EXT_LEN: usize = 5;
pub const UNIVERSAL_LEN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    GetParameter = 0x41,
    SetDevice = 0x42,
    SetDeviceExt = 0x45,
    LeaveProgmode = 0x51,
    LoadAddress = 0x55,
    Universal = 0x56,
    ProgPage = 0x64,
    ReadPage = 0x74,
    ReadSign = 0x75,
}

impl Command {
    /// Commands outside this set (GET_SYNC, ENTER_PROGMODE, ...) carry no
    /// parameters as far as the bootloader is concerned and are only
    /// acknowledged.
    pub fn parse(byte: u8) -> Option<Self> {
        match byte {
            0x41 => Some(Command::GetParameter),
            0x42 => Some(Command::SetDevice),
            0x45 => Some(Command::SetDeviceExt),
            0x51 => Some(Command::LeaveProgmode),
            0x55 => Some(Command::LoadAddress),
            0x56 => Some(Command::Universal),
            0x64 => Some(Command::ProgPage),
            0x74 => Some(Command::ReadPage),
            0x75 => Some(Command::ReadSign),
            _ => None,
        }
    }
}
