//! Switching the controlling terminal between cooked and raw input.
//!
//! The line editor needs every keystroke as soon as it is typed, arrows and
//! tab included, and must echo on its own. Raw mode here clears canonical
//! input and local echo, and turns off signal generation so Ctrl-C reaches
//! the editor as a key instead of killing the shell with the terminal still
//! raw. Output processing is left alone so child programs print as usual.
//!
//! Entering raw mode hands back a [`RawModeGuard`]. Dropping the guard puts
//! the saved mode back, so early returns, errors and panics inside the
//! editor all leave the terminal usable.

use crate::error::EditorError;

/// Something that can toggle raw input mode.
pub trait TerminalMode {
    fn enable_raw(&mut self) -> Result<(), EditorError>;
    fn disable_raw(&mut self) -> Result<(), EditorError>;
}

/// Restores cooked mode when dropped.
pub struct RawModeGuard<'a, T: TerminalMode + ?Sized> {
    terminal: &'a mut T,
}

impl<'a, T: TerminalMode + ?Sized> RawModeGuard<'a, T> {
    pub fn enter(terminal: &'a mut T) -> Result<Self, EditorError> {
        terminal.enable_raw()?;
        Ok(Self { terminal })
    }
}

impl<T: TerminalMode + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.disable_raw() {
            tracing::warn!("failed to restore terminal mode: {}", e);
        }
    }
}

/// For input that is not a terminal: pipes, files, tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTerminal;

impl TerminalMode for NoTerminal {
    fn enable_raw(&mut self) -> Result<(), EditorError> {
        Ok(())
    }

    fn disable_raw(&mut self) -> Result<(), EditorError> {
        Ok(())
    }
}

/// Standard input of the process, when it is a terminal.
///
/// Holds the single saved original mode between `enable_raw` and
/// `disable_raw`.
#[cfg(unix)]
#[derive(Default)]
pub struct StdinTerminal {
    saved: Option<nix::sys::termios::Termios>,
}

#[cfg(unix)]
impl StdinTerminal {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl TerminalMode for StdinTerminal {
    fn enable_raw(&mut self) -> Result<(), EditorError> {
        use nix::sys::termios::{self, LocalFlags, SetArg};

        let original = termios::tcgetattr(std::io::stdin())?;
        let mut raw = original.clone();
        raw.local_flags
            .remove(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG);
        termios::tcsetattr(std::io::stdin(), SetArg::TCSAFLUSH, &raw)?;
        self.saved = Some(original);
        tracing::trace!("terminal raw mode enabled");
        Ok(())
    }

    fn disable_raw(&mut self) -> Result<(), EditorError> {
        use nix::sys::termios::{self, SetArg};

        if let Some(original) = self.saved.take() {
            termios::tcsetattr(std::io::stdin(), SetArg::TCSAFLUSH, &original)?;
            tracing::trace!("terminal raw mode disabled");
        }
        Ok(())
    }
}
