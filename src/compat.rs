//! Method names of the classic Arduino `LiquidCrystal_I2C` library, for code ported from it.
//!
//! Import the trait to use them:
//! ```rust
//! use pcf8574_character_lcd::compat::LiquidCrystalCompat;
//!
//! lcd.cursor_on()?.printstr("ready")?;
//! ```
//!
//! The aliases forward to the regular methods. The remaining calls belong to larger display
//! families in the same API (contrast control, keypads, bar graphs) and do nothing here.
use embedded_hal::{delay::DelayNs, i2c};

use crate::{CharacterDisplayError, LiquidCrystalI2C};

pub trait LiquidCrystalCompat: Sized {
    type Error;

    /// Alias of `cursor`.
    fn cursor_on(&mut self) -> Result<&mut Self, Self::Error>;
    /// Alias of `no_cursor`.
    fn cursor_off(&mut self) -> Result<&mut Self, Self::Error>;
    /// Alias of `blink`.
    fn blink_on(&mut self) -> Result<&mut Self, Self::Error>;
    /// Alias of `no_blink`.
    fn blink_off(&mut self) -> Result<&mut Self, Self::Error>;
    /// Alias of `create_char`.
    fn load_custom_character(&mut self, char_num: u8, rows: [u8; 8]) -> Result<&mut Self, Self::Error>;
    /// Any non-zero value turns the backlight on.
    fn set_backlight(&mut self, new_val: u8) -> Result<&mut Self, Self::Error>;
    /// Alias of `print`.
    fn printstr(&mut self, text: &str) -> Result<&mut Self, Self::Error>;

    // unsupported calls, accepted and ignored

    fn on(&mut self) {}

    fn off(&mut self) {}

    fn set_delay(&mut self, _cmd_delay: i32, _char_delay: i32) {}

    fn status(&mut self) -> u8 {
        0
    }

    fn keypad(&mut self) -> u8 {
        0
    }

    fn init_bargraph(&mut self, _graph_type: u8) -> u8 {
        0
    }

    fn draw_horizontal_graph(&mut self, _row: u8, _column: u8, _len: u8, _pixel_col_end: u8) {}

    fn draw_vertical_graph(&mut self, _row: u8, _column: u8, _len: u8, _pixel_row_end: u8) {}

    fn set_contrast(&mut self, _new_val: u8) {}
}

impl<I2C, DELAY> LiquidCrystalCompat for LiquidCrystalI2C<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    type Error = CharacterDisplayError<I2C>;

    fn cursor_on(&mut self) -> Result<&mut Self, Self::Error> {
        self.cursor()
    }

    fn cursor_off(&mut self) -> Result<&mut Self, Self::Error> {
        self.no_cursor()
    }

    fn blink_on(&mut self) -> Result<&mut Self, Self::Error> {
        self.blink()
    }

    fn blink_off(&mut self) -> Result<&mut Self, Self::Error> {
        self.no_blink()
    }

    fn load_custom_character(&mut self, char_num: u8, rows: [u8; 8]) -> Result<&mut Self, Self::Error> {
        self.create_char(char_num, rows)
    }

    fn set_backlight(&mut self, new_val: u8) -> Result<&mut Self, Self::Error> {
        self.backlight(new_val != 0)
    }

    fn printstr(&mut self, text: &str) -> Result<&mut Self, Self::Error> {
        self.print(text)
    }
}
