//! Watchdog timer: prescaler table plus the on-chip adapter

/// WDP3..WDP0 prescaler selection. The discriminant is the 4-bit WDP value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    Ms1000 = 6,
    Ms2000 = 7,
    Ms4000 = 8,
    Ms8000 = 9,
}

const WDE: u8 = 0x08;
const WDCE: u8 = 0x10;

impl WatchdogTimeout {
    /// Nominal period in milliseconds.
    pub const fn millis(self) -> u32 {
        16u32 << (self as u8)
    }

    /// Maps a configured timeout to a prescaler. Only the values a session
    /// timeout may take are accepted.
    pub const fn from_millis(ms: u32) -> Option<Self> {
        match ms {
            500 => Some(Self::Ms500),
            1000 => Some(Self::Ms1000),
            2000 => Some(Self::Ms2000),
            4000 => Some(Self::Ms4000),
            8000 => Some(Self::Ms8000),
            _ => None,
        }
    }

    /// WDTCSR value enabling system reset mode with this period.
    /// WDP3 sits at bit 5, away from WDP2..0.
    pub const fn control_bits(self) -> u8 {
        let wdp = self as u8;
        WDE | (wdp & 0x07) | ((wdp & 0x08) << 2)
    }
}

/// Lets a busy-wait ask whether the countdown has already run out.
///
/// On silicon the core resets before anyone could observe this, so the
/// hardware adapter always answers `false`. Simulated watchdogs advance
/// their virtual time on every call.
pub trait Expiry {
    fn expired(&mut self) -> bool;
}

#[cfg(target_arch = "avr")]
pub use self::avr::Watchdog;

#[cfg(target_arch = "avr")]
mod avr {
    use super::{Expiry, WatchdogTimeout, WDCE, WDE};
    use avr_device::atmega328p::WDT;
    use embedded_hal::watchdog;

    pub struct Watchdog {
        _private: (),
    }

    impl Watchdog {
        #[inline]
        pub fn new() -> Self {
            Self { _private: () }
        }

        // Timed sequence: WDCE|WDE, then the new value within four cycles.
        // Only safe with interrupts off, which holds for the whole bootloader.
        #[inline]
        fn configure(&mut self, bits: u8) {
            unsafe {
                let p = WDT::ptr();
                (*p).wdtcsr.write(|w| w.bits(WDCE | WDE));
                (*p).wdtcsr.write(|w| w.bits(bits));
            }
        }
    }

    impl Default for Watchdog {
        fn default() -> Self {
            Self::new()
        }
    }

    impl watchdog::WatchdogEnable for Watchdog {
        type Time = WatchdogTimeout;

        fn start<T: Into<WatchdogTimeout>>(&mut self, period: T) {
            self.configure(period.into().control_bits());
        }
    }

    impl watchdog::Watchdog for Watchdog {
        #[inline]
        fn feed(&mut self) {
            avr_device::asm::wdr();
        }
    }

    impl watchdog::WatchdogDisable for Watchdog {
        fn disable(&mut self) {
            self.configure(0x00);
        }
    }

    impl Expiry for Watchdog {
        #[inline]
        fn expired(&mut self) -> bool {
            false
        }
    }
}
