//! Error types for the parts of the shell that can fail outside of a command.
//!
//! Commands themselves report through [`anyhow`]; these typed errors cover the
//! line editor (always fatal) and history persistence (reported, never fatal).

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

/// Failure while reading a line from the terminal.
///
/// Every variant is fatal: the read-eval loop stops and the process exits
/// after the terminal has been put back into cooked mode.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Reading a keystroke or echoing output failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The edit buffer could not grow to hold more input.
    #[error("allocation error: {0}")]
    Allocation(#[from] TryReserveError),

    /// Switching the terminal between raw and cooked mode failed.
    #[cfg(unix)]
    #[error("terminal mode change failed: {0}")]
    Terminal(#[from] nix::Error),
}

/// Failure while loading or saving the persisted history file.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history load from {}: {source}", path.display())]
    Load { path: PathBuf, source: io::Error },

    #[error("history save to {}: {source}", path.display())]
    Save { path: PathBuf, source: io::Error },
}
