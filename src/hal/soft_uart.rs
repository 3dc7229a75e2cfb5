//! Bit-banged 8N1 link
//!
//! Timing comes entirely from calibrated delays. One bit period is two
//! `half_bit` waits, so the receiver can park itself in the middle of the
//! start bit and then sample every following bit at its centre.
//! There is no framing check: a corrupted byte is indistinguishable from a
//! clean one.

use super::delay::TickDelay;
use super::LinkError;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;

pub struct SoftUart<TX, RX, D> {
    tx: TX,
    rx: RX,
    delay: D,
    half_bit: u16,
}

impl<TX, RX, D> SoftUart<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: TickDelay,
{
    /// `tx` is expected to already idle high.
    pub fn new(tx: TX, rx: RX, delay: D, half_bit: u16) -> Self {
        Self { tx, rx, delay, half_bit }
    }

    pub fn release(self) -> (TX, RX, D) {
        (self.tx, self.rx, self.delay)
    }

    #[inline(always)]
    fn wait_bit(&mut self) {
        self.delay.delay_ticks(self.half_bit);
        self.delay.delay_ticks(self.half_bit);
    }

    fn drive(&mut self, high: bool) -> Result<(), LinkError> {
        let driven = if high { self.tx.set_high() } else { self.tx.set_low() };
        driven.map_err(|_| LinkError::Line)
    }

    fn sample(&mut self) -> Result<bool, LinkError> {
        self.rx.is_high().map_err(|_| LinkError::Line)
    }
}

impl<TX, RX, D> serial::Read<u8> for SoftUart<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: TickDelay,
{
    type Error = LinkError;

    fn read(&mut self) -> nb::Result<u8, LinkError> {
        // Idle line: no start edge yet
        if self.sample()? {
            return Err(nb::Error::WouldBlock);
        }

        self.delay.delay_ticks(self.half_bit);

        let mut byte = 0u8;
        for _ in 0..8 {
            self.wait_bit();
            byte >>= 1;
            if self.sample()? {
                byte |= 0x80;
            }
        }

        // Step into the stop bit so a trailing zero bit is not taken for
        // the next start edge
        self.wait_bit();
        Ok(byte)
    }
}

impl<TX, RX, D> serial::Write<u8> for SoftUart<TX, RX, D>
where
    TX: OutputPin,
    RX: InputPin,
    D: TickDelay,
{
    type Error = LinkError;

    fn write(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        self.drive(false)?;
        self.wait_bit();

        for bit in 0..8 {
            self.drive(byte & (1 << bit) != 0)?;
            self.wait_bit();
        }

        self.drive(true)?;
        self.wait_bit();
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), LinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VirtualClock;
    use embedded_hal::serial::{Read, Write};
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};

    const HALF_BIT: u16 = 10;

    fn levels(byte: u8) -> Vec<State> {
        (0..8)
            .map(|bit| if byte & (1 << bit) != 0 { State::High } else { State::Low })
            .collect()
    }

    #[test]
    fn transmits_start_data_lsb_first_stop() {
        let mut expected = vec![PinTransaction::set(State::Low)];
        expected.extend(levels(0xA5).into_iter().map(PinTransaction::set));
        expected.push(PinTransaction::set(State::High));

        let tx = PinMock::new(&expected);
        let rx = PinMock::new(&[]);
        let mut uart = SoftUart::new(tx, rx, VirtualClock::new(), HALF_BIT);

        uart.write(0xA5).unwrap();

        let (mut tx, mut rx, clock) = uart.release();
        // start + 8 data + stop, two half bits each
        assert_eq!(clock.elapsed(), 20 * HALF_BIT as u64);
        tx.done();
        rx.done();
    }

    #[test]
    fn receives_lsb_first() {
        let mut expected = vec![PinTransaction::get(State::Low)];
        expected.extend(levels(0x3C).into_iter().map(PinTransaction::get));

        let tx = PinMock::new(&[]);
        let rx = PinMock::new(&expected);
        let mut uart = SoftUart::new(tx, rx, VirtualClock::new(), HALF_BIT);

        assert_eq!(uart.read().unwrap(), 0x3C);

        let (mut tx, mut rx, clock) = uart.release();
        // half bit into the start bit, 8 data bits, one bit into the stop bit
        assert_eq!(clock.elapsed(), 19 * HALF_BIT as u64);
        tx.done();
        rx.done();
    }

    #[test]
    fn idle_line_would_block_without_waiting() {
        let tx = PinMock::new(&[]);
        let rx = PinMock::new(&[PinTransaction::get(State::High)]);
        let mut uart = SoftUart::new(tx, rx, VirtualClock::new(), HALF_BIT);

        assert!(matches!(uart.read(), Err(nb::Error::WouldBlock)));

        let (mut tx, mut rx, clock) = uart.release();
        assert_eq!(clock.elapsed(), 0);
        tx.done();
        rx.done();
    }
}
