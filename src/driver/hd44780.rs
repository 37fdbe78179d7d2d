// HD44780 protocol engine.
// Sequences the power-up handshake that forces the controller into 4-bit mode, and sends every
// command and data byte as two nibble frames through the PCF8574 expander. All configuration is
// mirrored in `ControlState` because the controller is never read.

use core::marker::PhantomData;
use embedded_hal::{delay::DelayNs, i2c};

use crate::{
    driver::control::{
        ControlState, LCD_CMD_CLEARDISPLAY, LCD_CMD_CURSORSHIFT, LCD_CMD_FUNCTIONSET,
        LCD_CMD_RETURNHOME, LCD_CMD_SETCGRAMADDR, LCD_CMD_SETDDRAMADDR, LCD_FLAG_4BITMODE,
        LCD_FLAG_8BITMODE, LCD_FLAG_CURSORMOVE, LCD_FLAG_DISPLAYMOVE, LCD_FLAG_MOVELEFT,
        LCD_FLAG_MOVERIGHT,
    },
    frame::{build_frame, backlight_frame, RegisterSelect, Transmission, BYTES_PER_CHARACTER},
    CharacterDisplayError, DeviceSetupConfig, DisplayVariant, TextDirection,
};

/// Power-on settle time. The datasheet asks for 40 ms after Vcc rises above 2.7 V.
const POWER_ON_DELAY_MS: u32 = 50;
/// Wait after the first two 8-bit function set attempts (datasheet minimum is 4.1 ms).
const PROBE_DELAY_US: u32 = 4500;
/// Wait after the third 8-bit function set attempt (datasheet minimum is 100 µs).
const FINAL_PROBE_DELAY_US: u32 = 150;
/// Execution time of clear display and return home.
const CLEAR_HOME_DELAY_US: u32 = 2000;

/// Progress of the power-up sequence. The engine records the last step that completed, so after a
/// failed `init` this tells how far the controller got.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitPhase {
    Unpowered,
    EightBitProbe1,
    EightBitProbe2,
    EightBitProbe3,
    FourBitLatched,
    FunctionConfigured,
    DisplayOn,
    Cleared,
    EntryModeSet,
    /// Initialization finished, the display is ready.
    Homed,
}

/// What a cursor-shift instruction moves.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Shift {
    Display,
    Cursor,
}

pub struct HD44780<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    state: ControlState,
    phase: InitPhase,
    _marker: PhantomData<I2C>,
    _delay: PhantomData<DELAY>,
}

impl<I2C, DELAY> HD44780<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    pub fn new(backlight: bool) -> Self {
        Self {
            state: ControlState::new(backlight),
            phase: InitPhase::Unpowered,
            _marker: PhantomData,
            _delay: PhantomData,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn phase(&self) -> InitPhase {
        self.phase
    }

    /// Runs the power-up handshake. A bus error stops the sequence where it happened and is
    /// returned; nothing is retried.
    pub fn init(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Initializing HD44780 at {=u8:#x}, {=u8}x{=u8}",
            device.address,
            device.geometry.cols(),
            device.geometry.rows()
        );
        self.phase = InitPhase::Unpowered;
        self.state
            .reset_for_init(device.geometry.rows(), device.dot_size);

        device.delay.delay_ms(POWER_ON_DELAY_MS);

        // pull RS and RW low and put the backlight at its current level
        self.write_init_nibble(device, 0x00)?;

        // the controller may be in 8-bit mode or halfway through a 4-bit transfer. Three 8-bit
        // function sets bring it to a known state from either.
        let probes = [
            (InitPhase::EightBitProbe1, PROBE_DELAY_US),
            (InitPhase::EightBitProbe2, PROBE_DELAY_US),
            (InitPhase::EightBitProbe3, FINAL_PROBE_DELAY_US),
        ];
        for (phase, settle_us) in probes {
            self.write_init_nibble(device, LCD_CMD_FUNCTIONSET | LCD_FLAG_8BITMODE)?;
            self.phase = phase;
            device.delay.delay_us(settle_us);
        }

        self.write_init_nibble(device, LCD_CMD_FUNCTIONSET | LCD_FLAG_4BITMODE)?;
        self.phase = InitPhase::FourBitLatched;

        // from here on full bytes are sent as two nibbles
        self.command(device, self.state.function_set_command())?;
        self.phase = InitPhase::FunctionConfigured;

        self.command(device, self.state.display_control_command())?;
        self.phase = InitPhase::DisplayOn;

        self.clear(device)?;
        self.phase = InitPhase::Cleared;

        self.command(device, self.state.entry_mode_command())?;
        self.phase = InitPhase::EntryModeSet;

        self.home(device)?;
        self.phase = InitPhase::Homed;

        #[cfg(feature = "defmt")]
        defmt::debug!("HD44780 ready");
        Ok(())
    }

    /// Sends only the upper nibble of `value` with RS low. Used while the controller is still in
    /// 8-bit mode and would take a second nibble as a new instruction.
    fn write_init_nibble(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        let mut tx = Transmission::begin(&mut device.i2c, device.address);
        tx.pulse_enable(build_frame(
            value,
            RegisterSelect::Command,
            self.state.backlight(),
        ))?;
        tx.end()
    }

    fn queue_byte(
        &self,
        tx: &mut Transmission<'_, I2C>,
        value: u8,
        register: RegisterSelect,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        let backlight = self.state.backlight();
        tx.pulse_enable(build_frame(value, register, backlight))?;
        tx.pulse_enable(build_frame(value << 4, register, backlight))
    }

    fn send(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        value: u8,
        register: RegisterSelect,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        let mut tx = Transmission::begin(&mut device.i2c, device.address);
        self.queue_byte(&mut tx, value, register)?;
        tx.end()
    }

    /// Writes one byte to the instruction register.
    pub fn command(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.send(device, value, RegisterSelect::Command)
    }

    /// Writes one byte to the data register. Always accepts exactly one byte.
    pub fn write_char(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        value: u8,
    ) -> Result<usize, CharacterDisplayError<I2C>> {
        self.send(device, value, RegisterSelect::Data)?;
        Ok(1)
    }

    /// Writes a run of data bytes, packing as many characters as fit into each bus transaction.
    /// A character's four frames are never split across two transactions.
    pub fn write_data<T>(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        data: T,
    ) -> Result<usize, CharacterDisplayError<I2C>>
    where
        T: IntoIterator<Item = u8>,
    {
        let mut tx = Transmission::begin(&mut device.i2c, device.address);
        let mut count = 0;
        for value in data {
            tx.reserve(BYTES_PER_CHARACTER)?;
            self.queue_byte(&mut tx, value, RegisterSelect::Data)?;
            count += 1;
        }
        tx.end()?;
        Ok(count)
    }

    /// Sends each `char` as the low byte of its code point.
    pub fn print(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        text: &str,
    ) -> Result<usize, CharacterDisplayError<I2C>> {
        self.write_data(device, text.chars().map(|c| c as u8))
    }

    pub fn clear(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_CLEARDISPLAY)?;
        device.delay.delay_us(CLEAR_HOME_DELAY_US);
        // some OLED controllers leave the address counter where it was
        if device.variant == DisplayVariant::Oled {
            self.set_cursor(device, 0, 0)?;
        }
        Ok(())
    }

    pub fn home(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_RETURNHOME)?;
        device.delay.delay_us(CLEAR_HOME_DELAY_US);
        Ok(())
    }

    /// Moves the cursor to a zero-indexed column and row. Rows past the display are clamped to the
    /// last row, columns are sent as given.
    pub fn set_cursor(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        col: u8,
        row: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        let address = device.geometry.ddram_address(col, row);
        self.command(device, LCD_CMD_SETDDRAMADDR | address)
    }

    pub fn show_display(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        show_display: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.state.set_display(show_display);
        self.command(device, self.state.display_control_command())
    }

    pub fn show_cursor(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        show_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.state.set_cursor(show_cursor);
        self.command(device, self.state.display_control_command())
    }

    pub fn blink_cursor(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        blink_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.state.set_blink(blink_cursor);
        self.command(device, self.state.display_control_command())
    }

    fn shift(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        target: Shift,
        right: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        let target = match target {
            Shift::Display => LCD_FLAG_DISPLAYMOVE,
            Shift::Cursor => LCD_FLAG_CURSORMOVE,
        };
        let direction = if right {
            LCD_FLAG_MOVERIGHT
        } else {
            LCD_FLAG_MOVELEFT
        };
        self.command(device, LCD_CMD_CURSORSHIFT | target | direction)
    }

    pub fn scroll_left(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.shift(device, Shift::Display, false)
    }

    pub fn scroll_right(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.shift(device, Shift::Display, true)
    }

    pub fn move_cursor_left(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.shift(device, Shift::Cursor, false)
    }

    pub fn move_cursor_right(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.shift(device, Shift::Cursor, true)
    }

    pub fn set_text_direction(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        direction: TextDirection,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.state.set_text_direction(direction);
        self.command(device, self.state.entry_mode_command())
    }

    pub fn autoscroll(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        autoscroll: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.state.set_autoscroll(autoscroll);
        self.command(device, self.state.entry_mode_command())
    }

    /// Programs one of the eight CGRAM glyph slots. Only the low three bits of `location` are used.
    pub fn create_char(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        location: u8,
        charmap: &[u8; 8],
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_SETCGRAMADDR | ((location & 0x7) << 3))?;
        for &charmap_byte in charmap.iter() {
            self.write_char(device, charmap_byte)?;
        }
        Ok(())
    }

    /// Switches the backlight with a bare write to the expander. The controller is not involved.
    pub fn backlight(
        &mut self,
        device: &mut DeviceSetupConfig<I2C, DELAY>,
        on: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.state.set_backlight(on);
        let mut tx = Transmission::begin(&mut device.i2c, device.address);
        tx.write_byte(backlight_frame(on).bits())?;
        tx.end()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::{driver::addressing::Geometry, DotSize};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    const ADDRESS: u8 = 0x27;

    fn setup(
        i2c: I2cMock,
        cols: u8,
        rows: u8,
        variant: DisplayVariant,
    ) -> DeviceSetupConfig<I2cMock, NoopDelay> {
        DeviceSetupConfig {
            i2c,
            address: ADDRESS,
            geometry: Geometry::new(cols, rows),
            dot_size: DotSize::Dots5x8,
            variant,
            delay: NoopDelay::new(),
        }
    }

    /// The four bus bytes for one byte sent in 4-bit mode.
    fn byte_frames(value: u8, rs: bool, backlight: bool) -> Vec<u8> {
        let flags = (rs as u8) | if backlight { 0x08 } else { 0x00 };
        let high = (value & 0xF0) | flags;
        let low = (value << 4) | flags;
        std::vec![high | 0x04, high, low | 0x04, low]
    }

    fn command_transaction(value: u8, backlight: bool) -> I2cTransaction {
        I2cTransaction::write(ADDRESS, byte_frames(value, false, backlight))
    }

    #[test]
    fn test_command_frames() {
        let expected_transactions = [
            // 0xAD with RS = 0, backlight on
            I2cTransaction::write(
                ADDRESS,
                std::vec![
                    0b1010_1100, // high nibble, enable = 1
                    0b1010_1000, // high nibble, enable = 0
                    0b1101_1100, // low nibble, enable = 1
                    0b1101_1000, // low nibble, enable = 0
                ],
            ),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert!(engine.command(&mut device, 0xAD).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_write_char_frames() {
        let expected_transactions = [
            // 0xDE with RS = 1, backlight off
            I2cTransaction::write(
                ADDRESS,
                std::vec![
                    0b1101_0101, // high nibble, enable = 1, rs = 1
                    0b1101_0001, // high nibble, enable = 0, rs = 1
                    0b1110_0101, // low nibble, enable = 1, rs = 1
                    0b1110_0001, // low nibble, enable = 0, rs = 1
                ],
            ),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(false);
        assert_eq!(engine.write_char(&mut device, 0xDE).ok(), Some(1));
        device.i2c.done();
    }

    #[test]
    fn test_command_and_data_nibbles_for_all_bytes() {
        let mut expected_transactions = Vec::new();
        for value in 0..=u8::MAX {
            expected_transactions.push(I2cTransaction::write(
                ADDRESS,
                byte_frames(value, false, true),
            ));
            expected_transactions.push(I2cTransaction::write(
                ADDRESS,
                byte_frames(value, true, true),
            ));
        }
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        for value in 0..=u8::MAX {
            assert!(engine.command(&mut device, value).is_ok());
            assert!(engine.write_char(&mut device, value).is_ok());
        }
        device.i2c.done();
    }

    #[test]
    fn test_init_sequence_lcd_16x2() {
        let expected_transactions = [
            // reset the expander, backlight on
            I2cTransaction::write(ADDRESS, std::vec![0b0000_1100, 0b0000_1000]),
            // three times the upper nibble of 0x30
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            // upper nibble of 0x20
            I2cTransaction::write(ADDRESS, std::vec![0b0010_1100, 0b0010_1000]),
            // LCD_CMD_FUNCTIONSET | 2 lines = 0x28
            command_transaction(0x28, true),
            // LCD_CMD_DISPLAYCONTROL | display on = 0x0C
            command_transaction(0x0C, true),
            // LCD_CMD_CLEARDISPLAY
            command_transaction(0x01, true),
            // LCD_CMD_ENTRYMODESET | left to right = 0x06
            command_transaction(0x06, true),
            // LCD_CMD_RETURNHOME
            command_transaction(0x02, true),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert_eq!(engine.phase(), InitPhase::Unpowered);
        assert!(engine.init(&mut device).is_ok());
        assert_eq!(engine.phase(), InitPhase::Homed);
        device.i2c.done();
    }

    #[test]
    fn test_init_sequence_oled_rehomes_after_clear() {
        let expected_transactions = [
            I2cTransaction::write(ADDRESS, std::vec![0b0000_0100, 0b0000_0000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_0100, 0b0011_0000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_0100, 0b0011_0000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_0100, 0b0011_0000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0010_0100, 0b0010_0000]),
            command_transaction(0x28, false),
            command_transaction(0x0C, false),
            command_transaction(0x01, false),
            // LCD_CMD_SETDDRAMADDR for (0, 0)
            command_transaction(0x80, false),
            command_transaction(0x06, false),
            command_transaction(0x02, false),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 20, 4, DisplayVariant::Oled);
        let mut engine = HD44780::new(false);
        assert!(engine.init(&mut device).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_init_single_line_5x10() {
        let expected_transactions = [
            I2cTransaction::write(ADDRESS, std::vec![0b0000_1100, 0b0000_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0010_1100, 0b0010_1000]),
            // LCD_CMD_FUNCTIONSET | 1 line | 5x10 = 0x24
            command_transaction(0x24, true),
            command_transaction(0x0C, true),
            command_transaction(0x01, true),
            command_transaction(0x06, true),
            command_transaction(0x02, true),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 1, DisplayVariant::Lcd);
        device.dot_size = DotSize::Dots5x10;
        let mut engine = HD44780::new(true);
        assert!(engine.init(&mut device).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_init_stops_on_bus_error() {
        let expected_transactions = [
            I2cTransaction::write(ADDRESS, std::vec![0b0000_1100, 0b0000_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000]),
            I2cTransaction::write(ADDRESS, std::vec![0b0011_1100, 0b0011_1000])
                .with_error(ErrorKind::Other),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        let result = engine.init(&mut device);
        assert!(matches!(
            result,
            Err(CharacterDisplayError::I2cError(ErrorKind::Other))
        ));
        assert_eq!(engine.phase(), InitPhase::EightBitProbe1);
        device.i2c.done();
    }

    #[test]
    fn test_write_data_batches_transactions() {
        // 20 characters = 80 bus bytes = 32 + 32 + 16
        let text = b"abcdefghijklmnopqrst";
        let mut all_bytes = Vec::new();
        for &c in text.iter() {
            all_bytes.extend(byte_frames(c, true, true));
        }
        let expected_transactions = [
            I2cTransaction::write(ADDRESS, all_bytes[0..32].to_vec()),
            I2cTransaction::write(ADDRESS, all_bytes[32..64].to_vec()),
            I2cTransaction::write(ADDRESS, all_bytes[64..80].to_vec()),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 20, 4, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert_eq!(
            engine.write_data(&mut device, text.iter().copied()).ok(),
            Some(text.len())
        );
        device.i2c.done();
    }

    #[test]
    fn test_write_data_exact_multiple_of_capacity() {
        // 8 characters fill one transaction exactly; no empty trailing write
        let text = b"12345678";
        let mut all_bytes = Vec::new();
        for &c in text.iter() {
            all_bytes.extend(byte_frames(c, true, true));
        }
        let expected_transactions = [I2cTransaction::write(ADDRESS, all_bytes)];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert_eq!(
            engine.write_data(&mut device, text.iter().copied()).ok(),
            Some(8)
        );
        device.i2c.done();
    }

    #[test]
    fn test_write_data_empty() {
        let mut device = setup(I2cMock::new(&[]), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert_eq!(
            engine.write_data(&mut device, core::iter::empty::<u8>()).ok(),
            Some(0)
        );
        device.i2c.done();
    }

    #[test]
    fn test_print_hello() {
        let expected_transactions = [I2cTransaction::write(
            ADDRESS,
            std::vec![
                0b0110_1101, // 'h' 0x68 - high nibble, enable = 1
                0b0110_1001, // 'h' 0x68 - high nibble, enable = 0
                0b1000_1101, // 'h' 0x68 - low nibble, enable = 1
                0b1000_1001, // 'h' 0x68 - low nibble, enable = 0
                0b0110_1101, // 'e' 0x65 - high nibble, enable = 1
                0b0110_1001, // 'e' 0x65 - high nibble, enable = 0
                0b0101_1101, // 'e' 0x65 - low nibble, enable = 1
                0b0101_1001, // 'e' 0x65 - low nibble, enable = 0
                0b0110_1101, // 'l' 0x6C - high nibble, enable = 1
                0b0110_1001, // 'l' 0x6C - high nibble, enable = 0
                0b1100_1101, // 'l' 0x6C - low nibble, enable = 1
                0b1100_1001, // 'l' 0x6C - low nibble, enable = 0
                0b0110_1101, // 'l' 0x6C - high nibble, enable = 1
                0b0110_1001, // 'l' 0x6C - high nibble, enable = 0
                0b1100_1101, // 'l' 0x6C - low nibble, enable = 1
                0b1100_1001, // 'l' 0x6C - low nibble, enable = 0
                0b0110_1101, // 'o' 0x6F - high nibble, enable = 1
                0b0110_1001, // 'o' 0x6F - high nibble, enable = 0
                0b1111_1101, // 'o' 0x6F - low nibble, enable = 1
                0b1111_1001, // 'o' 0x6F - low nibble, enable = 0
            ],
        )];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert_eq!(engine.print(&mut device, "hello").ok(), Some(5));
        device.i2c.done();
    }

    #[test]
    fn test_print_sends_low_byte_of_code_point() {
        let mut all_bytes = byte_frames(0xE9, true, true); // 'é' U+00E9
        all_bytes.extend(byte_frames(0xAC, true, true)); // '€' U+20AC
        let expected_transactions = [I2cTransaction::write(ADDRESS, all_bytes)];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert_eq!(engine.print(&mut device, "é€").ok(), Some(2));
        device.i2c.done();
    }

    #[test]
    fn test_set_cursor() {
        let expected_transactions = [
            // (5, 1) on 16x2 = 0x80 | (0x40 + 5)
            command_transaction(0xC5, true),
            // (2, 3) on 16x2 clamps to row 1 = 0x80 | (0x40 + 2)
            command_transaction(0xC2, true),
            // (2, 2) on 16x2 is not clamped = 0x80 | (0x10 + 2)
            command_transaction(0x92, true),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert!(engine.set_cursor(&mut device, 5, 1).is_ok());
        assert!(engine.set_cursor(&mut device, 2, 3).is_ok());
        assert!(engine.set_cursor(&mut device, 2, 2).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_display_control_is_idempotent() {
        let expected_transactions = [
            command_transaction(0x0A, true),
            command_transaction(0x0A, true),
            command_transaction(0x0B, true),
            command_transaction(0x0F, true),
            command_transaction(0x0B, true),
            command_transaction(0x09, true),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        // without init all flags start cleared
        assert!(engine.show_cursor(&mut device, true).is_ok());
        assert!(engine.show_cursor(&mut device, true).is_ok());
        assert!(engine.blink_cursor(&mut device, true).is_ok());
        assert!(engine.show_display(&mut device, true).is_ok());
        assert!(engine.show_display(&mut device, false).is_ok());
        assert!(engine.show_cursor(&mut device, false).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_shift_commands_leave_state_alone() {
        let expected_transactions = [
            command_transaction(0x18, true), // display left
            command_transaction(0x1C, true), // display right
            command_transaction(0x10, true), // cursor left
            command_transaction(0x14, true), // cursor right
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        let before = *engine.state();
        assert!(engine.scroll_left(&mut device).is_ok());
        assert!(engine.scroll_right(&mut device).is_ok());
        assert!(engine.move_cursor_left(&mut device).is_ok());
        assert!(engine.move_cursor_right(&mut device).is_ok());
        assert_eq!(*engine.state(), before);
        device.i2c.done();
    }

    #[test]
    fn test_entry_mode_commands() {
        let expected_transactions = [
            command_transaction(0x06, true),
            command_transaction(0x07, true),
            command_transaction(0x05, true),
            command_transaction(0x04, true),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert!(engine
            .set_text_direction(&mut device, TextDirection::LeftToRight)
            .is_ok());
        assert!(engine.autoscroll(&mut device, true).is_ok());
        assert!(engine
            .set_text_direction(&mut device, TextDirection::RightToLeft)
            .is_ok());
        assert!(engine.autoscroll(&mut device, false).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_create_char() {
        let charmap = [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00];
        let mut expected_transactions = std::vec![
            // slot 9 is masked to 1: LCD_CMD_SETCGRAMADDR | (1 << 3) = 0x48
            command_transaction(0x48, true),
        ];
        for row in charmap {
            expected_transactions.push(I2cTransaction::write(
                ADDRESS,
                byte_frames(row, true, true),
            ));
        }
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert!(engine.create_char(&mut device, 9, &charmap).is_ok());
        device.i2c.done();
    }

    #[test]
    fn test_backlight_carries_into_frames() {
        let expected_transactions = [
            I2cTransaction::write(ADDRESS, std::vec![0b0000_0000]), // backlight off
            command_transaction(0x01, false),
            I2cTransaction::write(ADDRESS, std::vec![0b0000_1000]), // backlight on
            command_transaction(0x01, true),
        ];
        let mut device = setup(I2cMock::new(&expected_transactions), 16, 2, DisplayVariant::Lcd);
        let mut engine = HD44780::new(true);
        assert!(engine.backlight(&mut device, false).is_ok());
        assert!(!engine.state().backlight());
        assert!(engine.command(&mut device, 0x01).is_ok());
        assert!(engine.backlight(&mut device, true).is_ok());
        assert!(engine.command(&mut device, 0x01).is_ok());
        device.i2c.done();
    }
}
