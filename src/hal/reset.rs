//! Reset cause register (MCUSR)

/// Snapshot of the reset cause flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ResetFlags(u8);

impl ResetFlags {
    pub const POWER_ON: Self = Self(0x01);
    pub const EXTERNAL: Self = Self(0x02);
    pub const BROWN_OUT: Self = Self(0x04);
    pub const WATCHDOG: Self = Self(0x08);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for ResetFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Source of the reset cause. Reading clears the register, so a second
/// `take` in the same power cycle sees nothing.
pub trait ResetSource {
    fn take(&mut self) -> ResetFlags;
}

#[cfg(target_arch = "avr")]
pub use self::avr::McuStatus;

#[cfg(target_arch = "avr")]
mod avr {
    use super::{ResetFlags, ResetSource};
    use avr_device::atmega328p::CPU;

    pub struct McuStatus {
        _private: (),
    }

    impl McuStatus {
        pub fn new() -> Self {
            Self { _private: () }
        }
    }

    impl Default for McuStatus {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ResetSource for McuStatus {
        fn take(&mut self) -> ResetFlags {
            unsafe {
                let p = CPU::ptr();
                let bits = (*p).mcusr.read().bits();
                (*p).mcusr.write(|w| w.bits(0));
                ResetFlags::from_bits(bits)
            }
        }
    }
}
