//! A small interactive shell.
//!
//! Lines are read with a hand-rolled raw-mode editor that supports history
//! recall with the arrow keys and tab completion of builtin names and files
//! in the current directory. A submitted line is split on whitespace and
//! either handled by a builtin or run as an external program, with the shell
//! waiting for it to finish.
//!
//! The main entry point is [`Interpreter`], which owns the session state and
//! dispatches commands; [`LineEditor`] produces the lines it runs. Command
//! history is a bounded [`History`] persisted one command per line.

mod builtin;
pub mod command;
pub mod completion;
pub mod config;
pub mod editor;
pub mod env;
pub mod error;
mod external;
pub mod history;
mod interpreter;
pub mod keys;
pub mod lexer;
pub mod line_buffer;
pub mod terminal;
#[cfg(test)]
mod testing;

pub use builtin::BUILTIN_NAMES;
pub use command::Flow;
pub use completion::Completer;
pub use config::Config;
pub use editor::LineEditor;
pub use error::{EditorError, HistoryError};
pub use history::History;
/// Just a convenient re-export of the command dispatcher.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
