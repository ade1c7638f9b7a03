//! Terminal trait.

use crate::error::Result;

/// Abstraction over terminal backends.
///
/// The screen driver writes each frame's escape stream through
/// `write_raw`, so a test backend can capture the exact bytes.
pub trait Terminal: Send {
    /// Get the current terminal size as (columns, rows).
    fn size(&self) -> Result<(u16, u16)>;

    /// Enter raw mode and emit the alt-screen entry sequence.
    fn enter_raw_mode(&mut self) -> Result<()>;

    /// Exit raw mode and emit the alt-screen exit sequence.
    fn exit_raw_mode(&mut self) -> Result<()>;

    /// Write raw bytes to the terminal.
    fn write_raw(&mut self, data: &[u8]) -> Result<()>;

    /// Flush buffered output to the terminal.
    fn flush(&mut self) -> Result<()>;
}
