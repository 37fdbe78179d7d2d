//! This Rust `embedded-hal`-based library drives an [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display, or an OLED character display emulating one, through a PCF8574 I2C expander in an
//! embedded, `no_std` environment.
//!
//! The PCF8574 "I2C backpacks" are ubiquitous on eBay and AliExpress and have no clear branding. Some display makers
//! also put the PCF8574T directly on the display board. This library supports the common wiring with the display's
//! 4-bit data pins on P4-P7, RS on P0, RW on P1, EN on P2 and the backlight transistor on P3.
//!
//! Key features include:
//! - The full HD44780 power-up handshake, so the display comes up in a known state even after a host reset
//! - Batched writes: strings are sent with as few I2C transactions as the bus buffer allows
//! - Support for custom characters
//! - Backlight control
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//! - A compatibility trait with the method names of the classic Arduino `LiquidCrystal_I2C` library
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! pcf8574-character-lcd = { version = "0.1", features = ["defmt"] }
//! ```
//! The `features = ["defmt"]` line is optional and enables the `defmt` feature, which allows the library's errors to be
//! used with the `defmt` logging framework and emits debug logs during initialization. Another optional feature is
//! `features = ["ufmt"]`, which allows the `uwriteln!` and `uwrite!` macros to be used.
//!
//! Create the display:
//! ```rust
//! use pcf8574_character_lcd::{DisplayConfig, DotSize, LcdDisplayType, LiquidCrystalI2C};
//!
//! // board setup
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! // one of the common display sizes at the default address 0x27
//! let mut lcd = LiquidCrystalI2C::new(i2c, LcdDisplayType::Lcd16x2, delay);
//! // or any geometry, address and font
//! let mut lcd = LiquidCrystalI2C::new_with_config(
//!     i2c,
//!     DisplayConfig::new(16, 1).with_address(0x3F).with_dot_size(DotSize::Dots5x10),
//!     delay,
//! );
//! // OLED character displays have no backlight and need the cursor re-homed after a clear
//! let mut oled = LiquidCrystalI2C::new_oled(i2c, LcdDisplayType::Lcd20x4, delay);
//! ```
//!
//! Initialize the display:
//! ```rust
//! if let Err(e) = lcd.init() {
//!    panic!("Error initializing LCD: {}", e);
//! }
//! ```
//! Use the display:
//! ```rust
//! lcd.backlight(true)?.clear()?.set_cursor(0, 1)?;
//! lcd.print("Hello, world!")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "Hello, world!")?;
//! ```
//!
//! Each method returns a `Result` that wraps the display object in `Ok()`, allowing for easy chaining of commands.
//!
//! ### Timing
//! No delay is inserted between the bytes of a transfer. The driver relies on the time the bus needs per byte (about
//! 25 µs at 400 kHz) to cover the controller's enable pulse width and command execution time. The delay
//! implementation must not sleep shorter than asked during `init`, otherwise the controller may be left in an
//! undefined interface mode.
//!
//! ### Sharing the bus
//! The display takes ownership of the I2C bus. To share one bus with other peripherals, wrap it with one of the
//! `embedded-hal-bus` device types. Access to one display from several threads must be serialized by the caller.
//!
#![no_std]
use core::fmt::Display;

use embedded_hal::{delay::DelayNs, i2c};

pub mod compat;
mod driver;
pub mod frame;

pub use driver::{
    addressing::Geometry,
    control::{ControlState, DisplayControlFlags, EntryModeFlags, FunctionFlags},
    hd44780::InitPhase,
};

use driver::hd44780::HD44780;

/// Default I2C address of PCF8574T based adapters. PCF8574AT based adapters default to 0x3F.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x27;

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when using the display
pub enum CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    /// I2C error returned from the underlying I2C implementation
    I2cError(I2C::Error),
    /// Formatting error
    FormattingError(core::fmt::Error),
}

impl<I2C> From<core::fmt::Error> for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: core::fmt::Error) -> Self {
        CharacterDisplayError::FormattingError(err)
    }
}

impl<I2C> From<&CharacterDisplayError<I2C>> for &'static str
where
    I2C: i2c::I2c,
{
    fn from(err: &CharacterDisplayError<I2C>) -> Self {
        match err {
            CharacterDisplayError::I2cError(_) => "I2C error",
            CharacterDisplayError::FormattingError(_) => "Formatting error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<I2C> ufmt::uDisplay for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<I2C> Display for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Common display sizes. Used to determine the number of rows and columns.
pub enum LcdDisplayType {
    /// 20x4 display
    Lcd20x4,
    /// 20x2 display
    Lcd20x2,
    /// 16x2 display
    Lcd16x2,
    /// 16x4 display
    Lcd16x4,
    /// 16x1 display
    Lcd16x1,
    /// 8x2 display
    Lcd8x2,
    /// 40x2 display
    Lcd40x2,
}

impl From<&LcdDisplayType> for &'static str {
    fn from(display_type: &LcdDisplayType) -> Self {
        match display_type {
            LcdDisplayType::Lcd20x4 => "20x4",
            LcdDisplayType::Lcd20x2 => "20x2",
            LcdDisplayType::Lcd16x2 => "16x2",
            LcdDisplayType::Lcd16x4 => "16x4",
            LcdDisplayType::Lcd16x1 => "16x1",
            LcdDisplayType::Lcd8x2 => "8x2",
            LcdDisplayType::Lcd40x2 => "40x2",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LcdDisplayType {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for LcdDisplayType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for LcdDisplayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

impl LcdDisplayType {
    /// Get the number of rows for the display type
    pub const fn rows(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 4,
            LcdDisplayType::Lcd20x2 => 2,
            LcdDisplayType::Lcd16x2 => 2,
            LcdDisplayType::Lcd16x4 => 4,
            LcdDisplayType::Lcd16x1 => 1,
            LcdDisplayType::Lcd8x2 => 2,
            LcdDisplayType::Lcd40x2 => 2,
        }
    }

    /// Get the number of columns for the display type
    pub const fn cols(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 20,
            LcdDisplayType::Lcd20x2 => 20,
            LcdDisplayType::Lcd16x2 => 16,
            LcdDisplayType::Lcd16x4 => 16,
            LcdDisplayType::Lcd16x1 => 16,
            LcdDisplayType::Lcd8x2 => 8,
            LcdDisplayType::Lcd40x2 => 40,
        }
    }
}

/// Character font. The 5x10 font is only honored on single line displays.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DotSize {
    #[default]
    Dots5x8,
    Dots5x10,
}

/// Kind of panel behind the controller.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayVariant {
    /// Liquid crystal display. The backlight starts on, unlike the Arduino `LiquidCrystal_I2C` library,
    /// which brings every panel up with the backlight off.
    #[default]
    Lcd,
    /// OLED character display emulating an HD44780. Starts with the backlight pin off, and the cursor is
    /// explicitly moved to (0, 0) after every clear.
    Oled,
}

impl DisplayVariant {
    const fn default_backlight(&self) -> bool {
        match self {
            DisplayVariant::Lcd => true,
            DisplayVariant::Oled => false,
        }
    }
}

/// Direction the cursor moves after a character is written.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Display configuration used to create a `LiquidCrystalI2C`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// 7-bit I2C address of the expander
    pub address: u8,
    pub cols: u8,
    pub rows: u8,
    pub dot_size: DotSize,
    pub variant: DisplayVariant,
}

impl DisplayConfig {
    /// Configuration for a `cols` x `rows` LCD at the default address using the 5x8 font.
    pub const fn new(cols: u8, rows: u8) -> Self {
        Self {
            address: DEFAULT_I2C_ADDRESS,
            cols,
            rows,
            dot_size: DotSize::Dots5x8,
            variant: DisplayVariant::Lcd,
        }
    }

    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub const fn with_dot_size(mut self, dot_size: DotSize) -> Self {
        self.dot_size = dot_size;
        self
    }

    pub const fn with_variant(mut self, variant: DisplayVariant) -> Self {
        self.variant = variant;
        self
    }
}

impl From<LcdDisplayType> for DisplayConfig {
    fn from(display_type: LcdDisplayType) -> Self {
        DisplayConfig::new(display_type.cols(), display_type.rows())
    }
}

pub struct DeviceSetupConfig<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    i2c: I2C,
    address: u8,
    geometry: Geometry,
    dot_size: DotSize,
    variant: DisplayVariant,
    delay: DELAY,
}

/// An HD44780 compatible character display behind a PCF8574 I2C expander.
pub struct LiquidCrystalI2C<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    config: DeviceSetupConfig<I2C, DELAY>,
    device: HD44780<I2C, DELAY>,
}

impl<I2C, DELAY> LiquidCrystalI2C<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Create a new LCD object at the default I2C address.
    pub fn new(i2c: I2C, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self::new_with_config(i2c, DisplayConfig::from(lcd_type), delay)
    }

    /// Create a new LCD object at a specific I2C address.
    pub fn new_with_address(i2c: I2C, address: u8, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self::new_with_config(
            i2c,
            DisplayConfig::from(lcd_type).with_address(address),
            delay,
        )
    }

    /// Create a new OLED character display object at the default I2C address.
    pub fn new_oled(i2c: I2C, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self::new_with_config(
            i2c,
            DisplayConfig::from(lcd_type).with_variant(DisplayVariant::Oled),
            delay,
        )
    }

    /// Create a new display object from a full configuration.
    pub fn new_with_config(i2c: I2C, config: DisplayConfig, delay: DELAY) -> Self {
        Self {
            config: DeviceSetupConfig {
                i2c,
                address: config.address,
                geometry: Geometry::new(config.cols, config.rows),
                dot_size: config.dot_size,
                variant: config.variant,
                delay,
            },
            device: HD44780::new(config.variant.default_backlight()),
        }
    }

    /// Initialize the display. This must be called before using the display. If the bus fails part way
    /// through, the error is returned and the display is left wherever the sequence stopped; see `init_phase`.
    pub fn init(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.init(&mut self.config)?;
        Ok(self)
    }

    /// Consumes the display and gives back the I2C bus and the delay.
    pub fn release(self) -> (I2C, DELAY) {
        (self.config.i2c, self.config.delay)
    }

    /// returns the configured I2C address
    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// returns the display geometry
    pub fn geometry(&self) -> Geometry {
        self.config.geometry
    }

    pub fn dot_size(&self) -> DotSize {
        self.config.dot_size
    }

    pub fn variant(&self) -> DisplayVariant {
        self.config.variant
    }

    /// The controller configuration as last sent to the display.
    pub fn control_state(&self) -> ControlState {
        *self.device.state()
    }

    /// returns whether the backlight is currently on
    pub fn is_backlight_on(&self) -> bool {
        self.device.state().backlight()
    }

    /// How far the power-up sequence got. `InitPhase::Homed` once `init` succeeded.
    pub fn init_phase(&self) -> InitPhase {
        self.device.phase()
    }

    //--------------------------------------------------------------------------------------------------
    // low level writes
    //--------------------------------------------------------------------------------------------------

    /// Sends a raw instruction byte to the controller. The mirrored control state is not updated, so prefer
    /// the high level methods for anything they cover.
    pub fn command(&mut self, value: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.command(&mut self.config, value)?;
        Ok(self)
    }

    /// Writes a single character code at the cursor. Returns the number of bytes written, always 1.
    pub fn write_char(&mut self, value: u8) -> Result<usize, CharacterDisplayError<I2C>> {
        self.device.write_char(&mut self.config, value)
    }

    /// Writes raw character codes at the cursor. Returns the number of characters written.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize, CharacterDisplayError<I2C>> {
        self.device.write_data(&mut self.config, data.iter().copied())
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Clear the display
    pub fn clear(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.clear(&mut self.config)?;
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.home(&mut self.config)?;
        Ok(self)
    }

    /// Set the cursor position at specified column and row. Columns and rows are zero-indexed.
    /// A row greater than the number of rows is moved to the last row. The column is not checked.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.set_cursor(&mut self.config, col, row)?;
        Ok(self)
    }

    /// Set the cursor visibility.
    pub fn show_cursor(&mut self, show_cursor: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.show_cursor(&mut self.config, show_cursor)?;
        Ok(self)
    }

    /// Show the underline cursor.
    pub fn cursor(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.show_cursor(true)
    }

    /// Hide the underline cursor.
    pub fn no_cursor(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.show_cursor(false)
    }

    /// Set the cursor blinking.
    pub fn blink_cursor(&mut self, blink_cursor: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.blink_cursor(&mut self.config, blink_cursor)?;
        Ok(self)
    }

    pub fn blink(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.blink_cursor(true)
    }

    pub fn no_blink(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.blink_cursor(false)
    }

    /// Set the display visibility. The display RAM is kept while the display is off.
    pub fn show_display(&mut self, show_display: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.show_display(&mut self.config, show_display)?;
        Ok(self)
    }

    pub fn display(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.show_display(true)
    }

    pub fn no_display(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.show_display(false)
    }

    /// Scroll the display to the left.
    pub fn scroll_display_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.scroll_left(&mut self.config)?;
        Ok(self)
    }

    /// Scroll the display to the right.
    pub fn scroll_display_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.scroll_right(&mut self.config)?;
        Ok(self)
    }

    /// Move the cursor one position to the left without changing the display RAM.
    pub fn move_cursor_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.move_cursor_left(&mut self.config)?;
        Ok(self)
    }

    /// Move the cursor one position to the right without changing the display RAM.
    pub fn move_cursor_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.move_cursor_right(&mut self.config)?;
        Ok(self)
    }

    /// Set the text flow direction.
    pub fn set_text_direction(
        &mut self,
        direction: TextDirection,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.set_text_direction(&mut self.config, direction)?;
        Ok(self)
    }

    /// Set the text flow direction to left to right.
    pub fn left_to_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.set_text_direction(TextDirection::LeftToRight)
    }

    /// Set the text flow direction to right to left.
    pub fn right_to_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.set_text_direction(TextDirection::RightToLeft)
    }

    /// Set the auto scroll mode. When on, the display shifts on every write instead of the cursor moving,
    /// which 'right justifies' text at the cursor.
    pub fn autoscroll(&mut self, autoscroll: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.autoscroll(&mut self.config, autoscroll)?;
        Ok(self)
    }

    /// Create a new custom character in one of the 8 CGRAM slots. Display it by writing the slot number
    /// as a character code. Leaves the controller addressing CGRAM, so call `set_cursor` or `home`
    /// before writing text again.
    pub fn create_char(
        &mut self,
        location: u8,
        charmap: [u8; 8],
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.create_char(&mut self.config, location, &charmap)?;
        Ok(self)
    }

    /// Same as `create_char`, with the glyph taken from a table placed in flash.
    pub fn create_char_from_table(
        &mut self,
        location: u8,
        charmap: &'static [u8; 8],
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.create_char(&mut self.config, location, charmap)?;
        Ok(self)
    }

    /// Prints a string to the LCD at the current cursor position. Each `char` is sent as the low byte of
    /// its code point, so Latin-1 characters map to the same byte but anything above U+00FF is mangled
    /// ('€', U+20AC, is sent as 0xAC). Use `write_bytes` to send character ROM codes directly.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.print(&mut self.config, text)?;
        Ok(self)
    }

    /// Turn the backlight on or off
    pub fn backlight(&mut self, on: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.device.backlight(&mut self.config, on)?;
        Ok(self)
    }

    pub fn backlight_on(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.backlight(true)
    }

    pub fn backlight_off(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.backlight(false)
    }
}

/// Implement the `core::fmt::Write` trait for the display, allowing it to be used with the `write!` macro.
impl<I2C, DELAY> core::fmt::Write for LiquidCrystalI2C<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the display, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<I2C, DELAY> ufmt::uWrite for LiquidCrystalI2C<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), CharacterDisplayError<I2C>> {
        self.print(s)?;
        Ok(())
    }

    type Error = CharacterDisplayError<I2C>;
}
