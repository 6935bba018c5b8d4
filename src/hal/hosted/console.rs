// src/hal/hosted/console.rs
//! Terminal console over stdin/stdout, screen control through crossterm.

use std::io::{self, BufRead, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color as TermColor, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;

use crate::error::HalError;
use crate::hal::console::{Color, Console};

const FALLBACK_SIZE: (u16, u16) = (80, 25);

#[derive(Debug, Default)]
pub struct HostConsole;

impl HostConsole {
    pub fn new() -> Self {
        Self
    }
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Black => TermColor::Black,
        Color::White => TermColor::White,
        Color::Gray => TermColor::Grey,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::Green,
        Color::Yellow => TermColor::Yellow,
        Color::Cyan => TermColor::Cyan,
        Color::Magenta => TermColor::Magenta,
    }
}

/// One line without its terminator. Bytes that are not UTF-8 become U+FFFD.
fn read_text_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(None);
    }
    while matches!(bytes.last(), Some(b'\n' | b'\r')) {
        bytes.pop();
    }
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

impl Console for HostConsole {
    fn write(&mut self, text: &str) -> Result<(), HalError> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, HalError> {
        Ok(read_text_line(&mut io::stdin().lock())?)
    }

    fn read_key(&mut self) -> Result<(), HalError> {
        // stdin is line-buffered on a hosted terminal, Enter is the key.
        self.read_line().map(|_| ())
    }

    fn set_foreground(&mut self, color: Color) -> Result<(), HalError> {
        let mut out = io::stdout().lock();
        queue!(out, SetForegroundColor(term_color(color)))?;
        out.flush()?;
        Ok(())
    }

    fn set_background(&mut self, color: Color) -> Result<(), HalError> {
        let mut out = io::stdout().lock();
        queue!(out, SetBackgroundColor(term_color(color)))?;
        out.flush()?;
        Ok(())
    }

    fn reset_colors(&mut self) -> Result<(), HalError> {
        let mut out = io::stdout().lock();
        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HalError> {
        let mut out = io::stdout().lock();
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        out.flush()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or(FALLBACK_SIZE)
    }

    fn set_cursor(&mut self, column: u16, row: u16) -> Result<(), HalError> {
        let mut out = io::stdout().lock();
        queue!(out, MoveTo(column, row))?;
        out.flush()?;
        Ok(())
    }
}
