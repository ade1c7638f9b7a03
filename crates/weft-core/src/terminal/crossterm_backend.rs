//! Crossterm-based terminal backend.

use std::io::{self, Write};

use crossterm::terminal;

use crate::error::Result;

use super::traits::Terminal;
use super::{ENTER_SEQUENCE, EXIT_SEQUENCE};

/// Terminal backend using crossterm for real terminal I/O.
pub struct CrosstermBackend {
    raw_mode: bool,
}

impl CrosstermBackend {
    /// Create a new crossterm backend.
    pub fn new() -> Self {
        Self { raw_mode: false }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermBackend {
    fn size(&self) -> Result<(u16, u16)> {
        let (w, h) = terminal::size()?;
        Ok((w, h))
    }

    fn enter_raw_mode(&mut self) -> Result<()> {
        if !self.raw_mode {
            terminal::enable_raw_mode()?;
            io::stdout().write_all(ENTER_SEQUENCE.as_bytes())?;
            io::stdout().flush()?;
            self.raw_mode = true;
        }
        Ok(())
    }

    fn exit_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode {
            io::stdout().write_all(EXIT_SEQUENCE.as_bytes())?;
            io::stdout().flush()?;
            terminal::disable_raw_mode()?;
            self.raw_mode = false;
        }
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        io::stdout().write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = io::stdout().write_all(EXIT_SEQUENCE.as_bytes());
            let _ = io::stdout().flush();
            let _ = terminal::disable_raw_mode();
        }
    }
}
