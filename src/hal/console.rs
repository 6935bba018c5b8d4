// src/hal/console.rs
//! Text console: line input, coloured output, screen control.

use crate::error::HalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
    Gray,
    Red,
    Green,
    Yellow,
    Cyan,
    Magenta,
}

pub trait Console {
    fn write(&mut self, text: &str) -> Result<(), HalError>;

    fn write_line(&mut self, text: &str) -> Result<(), HalError> {
        self.write(text)?;
        self.write("\n")
    }

    /// Block until a full line arrives. `None` means input is closed.
    fn read_line(&mut self) -> Result<Option<String>, HalError>;

    /// Block until the operator presses a key.
    fn read_key(&mut self) -> Result<(), HalError>;

    fn set_foreground(&mut self, color: Color) -> Result<(), HalError>;

    fn set_background(&mut self, color: Color) -> Result<(), HalError>;

    fn reset_colors(&mut self) -> Result<(), HalError>;

    fn clear(&mut self) -> Result<(), HalError>;

    /// (columns, rows)
    fn size(&self) -> (u16, u16);

    fn set_cursor(&mut self, column: u16, row: u16) -> Result<(), HalError>;
}
