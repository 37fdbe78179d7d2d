// Host-side mirror of the HD44780 configuration registers. The controller cannot be read back
// over the expander, so the last value written is kept here and every change is sent in full.

use bitfield::bitfield;

use crate::{DotSize, TextDirection};

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
pub const LCD_CMD_CURSORSHIFT: u8 = 0x10; //  Lets you move the cursor
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
pub const LCD_CMD_SETCGRAMADDR: u8 = 0x40; //  Used to set the CGRAM (character generator RAM) with characters
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// flags for display/cursor shift
pub const LCD_FLAG_DISPLAYMOVE: u8 = 0x08; //  Flag for moving the display
pub const LCD_FLAG_CURSORMOVE: u8 = 0x00; //  Flag for moving the cursor
pub const LCD_FLAG_MOVERIGHT: u8 = 0x04; //  Flag for moving right
pub const LCD_FLAG_MOVELEFT: u8 = 0x00; //  Flag for moving left

// flags for function set
pub const LCD_FLAG_8BITMODE: u8 = 0x10; //  LCD 8 bit mode
pub const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode

bitfield! {
    /// Function set register: interface width, line count and font.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct FunctionFlags(u8);
    impl Debug;
    pub font_5x10, set_font_5x10: 2;
    pub two_line, set_two_line: 3;
    pub eight_bit, set_eight_bit: 4;
}

bitfield! {
    /// Display on/off control register.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct DisplayControlFlags(u8);
    impl Debug;
    pub blink, set_blink: 0;
    pub cursor, set_cursor: 1;
    pub display, set_display: 2;
}

bitfield! {
    /// Entry mode register: cursor direction after a write and display shift.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct EntryModeFlags(u8);
    impl Debug;
    pub shift, set_shift: 0;
    pub left_to_right, set_left_to_right: 1;
}

/// The mirrored controller state plus the expander backlight level.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ControlState {
    function: FunctionFlags,
    display_control: DisplayControlFlags,
    entry_mode: EntryModeFlags,
    backlight: bool,
}

impl ControlState {
    pub(crate) const fn new(backlight: bool) -> Self {
        Self {
            function: FunctionFlags(LCD_FLAG_4BITMODE),
            display_control: DisplayControlFlags(0),
            entry_mode: EntryModeFlags(0),
            backlight,
        }
    }

    /// Resets the three controller registers to the values the power-up sequence programs.
    /// The backlight level is left alone.
    pub(crate) fn reset_for_init(&mut self, rows: u8, dot_size: DotSize) {
        let mut function = FunctionFlags(LCD_FLAG_4BITMODE);
        function.set_two_line(rows > 1);
        // only single line displays can use the 10 pixel high font
        function.set_font_5x10(dot_size == DotSize::Dots5x10 && rows == 1);
        self.function = function;

        let mut display_control = DisplayControlFlags(0);
        display_control.set_display(true);
        self.display_control = display_control;

        let mut entry_mode = EntryModeFlags(0);
        entry_mode.set_left_to_right(true);
        self.entry_mode = entry_mode;
    }

    pub fn function(&self) -> FunctionFlags {
        self.function
    }

    pub fn display_control(&self) -> DisplayControlFlags {
        self.display_control
    }

    pub fn entry_mode(&self) -> EntryModeFlags {
        self.entry_mode
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    pub(crate) fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    pub(crate) fn set_display(&mut self, on: bool) {
        self.display_control.set_display(on);
    }

    pub(crate) fn set_cursor(&mut self, on: bool) {
        self.display_control.set_cursor(on);
    }

    pub(crate) fn set_blink(&mut self, on: bool) {
        self.display_control.set_blink(on);
    }

    pub(crate) fn set_text_direction(&mut self, direction: TextDirection) {
        self.entry_mode
            .set_left_to_right(direction == TextDirection::LeftToRight);
    }

    pub(crate) fn set_autoscroll(&mut self, on: bool) {
        self.entry_mode.set_shift(on);
    }

    /// The direction text currently flows in.
    pub fn text_direction(&self) -> TextDirection {
        if self.entry_mode.left_to_right() {
            TextDirection::LeftToRight
        } else {
            TextDirection::RightToLeft
        }
    }

    pub fn function_set_command(&self) -> u8 {
        LCD_CMD_FUNCTIONSET | self.function.0
    }

    pub fn display_control_command(&self) -> u8 {
        LCD_CMD_DISPLAYCONTROL | self.display_control.0
    }

    pub fn entry_mode_command(&self) -> u8 {
        LCD_CMD_ENTRYMODESET | self.entry_mode.0
    }
}
