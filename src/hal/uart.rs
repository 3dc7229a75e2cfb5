//! Polled USART0 link
//!
//! No interrupts and no buffering: the bootloader runs with the global
//! interrupt flag clear, so every byte is moved by spinning on the status
//! flags.

use super::LinkError;
use crate::config::UBRR;
use avr_device::atmega328p::USART0;
use embedded_hal::serial;

// UCSR0A
const RXC0: u8 = 0x80;
const UDRE0: u8 = 0x20;
const FE0: u8 = 0x10;
const U2X0: u8 = 0x02;

// UCSR0B
const RXEN0: u8 = 0x10;
const TXEN0: u8 = 0x08;

// UCSR0C: asynchronous, 8 data bits, no parity, 1 stop bit
const FORMAT_8N1: u8 = 0x06;

pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();
            (*p).ucsr0a.write(|w| w.bits(U2X0));
            (*p).ubrr0.write(|w| w.bits(UBRR));
            (*p).ucsr0b.write(|w| w.bits(RXEN0 | TXEN0));
            (*p).ucsr0c.write(|w| w.bits(FORMAT_8N1));
        }
        Self { _private: () }
    }

    #[inline(always)]
    fn status(&self) -> u8 {
        unsafe { (*USART0::ptr()).ucsr0a.read().bits() }
    }
}

impl Default for Usart0 {
    fn default() -> Self {
        Self::new()
    }
}

impl serial::Read<u8> for Usart0 {
    type Error = LinkError;

    fn read(&mut self) -> nb::Result<u8, LinkError> {
        let status = self.status();
        if status & RXC0 == 0 {
            return Err(nb::Error::WouldBlock);
        }

        // FE0 belongs to the byte at the head of the FIFO, so it has to be
        // sampled before UDR0 is read
        let byte = unsafe { (*USART0::ptr()).udr0.read().bits() };
        if status & FE0 != 0 {
            Err(nb::Error::Other(LinkError::Framing(byte)))
        } else {
            Ok(byte)
        }
    }
}

impl serial::Write<u8> for Usart0 {
    type Error = LinkError;

    fn write(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        if self.status() & UDRE0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        unsafe {
            (*USART0::ptr()).udr0.write(|w| w.bits(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), LinkError> {
        if self.status() & UDRE0 == 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}
