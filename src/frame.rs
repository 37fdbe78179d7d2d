//! Encoding of HD44780 nibbles onto the output port of a PCF8574 expander.
//!
//! The common "I2C backpack" wires the expander pins to the display as follows:
//!
//! | P7..P4 | P3        | P2 | P1 | P0 |
//! |--------|-----------|----|----|----|
//! | D7..D4 | backlight | EN | RW | RS |
//!
//! Every nibble sent to the controller is latched by an enable pulse, which takes two writes to the
//! expander: one with EN high, one with EN low. No delay is inserted between the two. At 400 kHz a
//! single byte on the bus already takes about 25 µs, which is well above the 450 ns minimum enable
//! pulse width, and the following nibble arrives later than the 37 µs the controller needs to settle.
//! Hosts with a much faster bus must slow it down; this is not checked at runtime.
use bitfield::bitfield;
use embedded_hal::i2c;

use crate::CharacterDisplayError;

/// Number of bytes a single I2C transmission may carry before it has to be flushed. Matches the
/// transmit buffer of the smallest common bus drivers.
pub const TRANSMISSION_CAPACITY: usize = 32;

/// Bus bytes needed for one full byte sent in 4-bit mode: two nibbles, each with EN high then low.
pub const BYTES_PER_CHARACTER: usize = 4;

bitfield! {
    /// One output byte of the PCF8574 expander.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ExpanderFrame(u8);
    impl Debug;
    pub rs, set_rs: 0;
    pub rw, set_rw: 1;
    pub enable, set_enable: 2;
    pub backlight, set_backlight: 3;
    pub u8, data, set_data: 7, 4;
}

impl ExpanderFrame {
    /// Raw value written to the expander port.
    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Selects which HD44780 register a byte is written to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelect {
    /// Instruction register (RS low).
    Command,
    /// Data register, either DDRAM or CGRAM depending on the last address set (RS high).
    Data,
}

/// Builds the expander frame presenting the upper nibble of `value` on D7..D4. The enable bit is
/// always clear in the returned frame; use [`Transmission::pulse_enable`] to latch it.
pub fn build_frame(value: u8, register: RegisterSelect, backlight: bool) -> ExpanderFrame {
    let mut frame = ExpanderFrame(0);
    frame.set_data(value >> 4);
    frame.set_rs(register == RegisterSelect::Data);
    frame.set_backlight(backlight);
    frame
}

/// Frame that only drives the backlight pin. No controller data is latched by it.
pub fn backlight_frame(backlight: bool) -> ExpanderFrame {
    let mut frame = ExpanderFrame(0);
    frame.set_backlight(backlight);
    frame
}

/// A bounded, write-only I2C transmission to the expander.
///
/// Bytes are queued locally and sent as one `I2c::write` when the transmission is flushed or
/// ended. If the queue is full, it is flushed before more bytes are accepted, so a transmission never
/// exceeds [`TRANSMISSION_CAPACITY`] bytes on the bus.
pub struct Transmission<'a, I2C>
where
    I2C: i2c::I2c,
{
    i2c: &'a mut I2C,
    address: u8,
    buffer: [u8; TRANSMISSION_CAPACITY],
    len: usize,
}

impl<'a, I2C> Transmission<'a, I2C>
where
    I2C: i2c::I2c,
{
    /// Opens a transmission to the expander at `address`. Nothing is sent until the first flush.
    pub fn begin(i2c: &'a mut I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: [0; TRANSMISSION_CAPACITY],
            len: 0,
        }
    }

    /// Number of bytes that can still be queued before a flush is needed.
    pub fn remaining(&self) -> usize {
        TRANSMISSION_CAPACITY - self.len
    }

    /// Number of bytes currently queued.
    pub fn queued(&self) -> usize {
        self.len
    }

    /// Queues one raw byte for the expander port.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), CharacterDisplayError<I2C>> {
        if self.remaining() == 0 {
            self.flush()?;
        }
        self.buffer[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Queues the enable pulse for `frame`: the frame with EN set, followed by the frame with EN clear.
    pub fn pulse_enable(&mut self, frame: ExpanderFrame) -> Result<(), CharacterDisplayError<I2C>> {
        let mut latch = frame;
        latch.set_enable(true);
        self.write_byte(latch.bits())?;
        latch.set_enable(false);
        self.write_byte(latch.bits())
    }

    /// Makes sure `count` more bytes fit in the current bus transaction, flushing what is queued
    /// if they do not.
    pub fn reserve(&mut self, count: usize) -> Result<(), CharacterDisplayError<I2C>> {
        if self.remaining() < count {
            #[cfg(feature = "defmt")]
            defmt::trace!("Transmission full, flushing {=usize} bytes", self.len);
            self.flush()?;
        }
        Ok(())
    }

    /// Sends the queued bytes as one I2C write and starts a new transaction. Does nothing if
    /// nothing is queued.
    pub fn flush(&mut self) -> Result<(), CharacterDisplayError<I2C>> {
        if self.len == 0 {
            return Ok(());
        }
        let len = self.len;
        self.len = 0;
        self.i2c
            .write(self.address, &self.buffer[..len])
            .map_err(CharacterDisplayError::I2cError)
    }

    /// Sends whatever is still queued and closes the transmission.
    pub fn end(mut self) -> Result<(), CharacterDisplayError<I2C>> {
        self.flush()
    }
}
