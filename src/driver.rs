pub mod addressing;
pub mod control;
pub mod hd44780;
