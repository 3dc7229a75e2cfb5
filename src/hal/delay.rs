/// Busy-wait for a number of abstract ticks.
///
/// One tick is one pass of a three-cycle spin loop on hardware, which is the
/// unit the soft UART bit timing is calibrated in.
pub trait TickDelay {
    fn delay_ticks(&mut self, ticks: u16);
}

/// Calibrated spin loop.
pub struct SpinDelay {
    _private: (),
}

impl SpinDelay {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SpinDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl TickDelay for SpinDelay {
    #[inline(never)]
    fn delay_ticks(&mut self, ticks: u16) {
        for _ in 0..ticks {
            #[cfg(target_arch = "avr")]
            avr_device::asm::nop();
            #[cfg(not(target_arch = "avr"))]
            core::hint::spin_loop();
        }
    }
}
