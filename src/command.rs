use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// What the read-eval loop should do after a command finishes.
///
/// Every command, builtin or external, answers with one of these. Only
/// `exit` ever asks the loop to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Run the command to completion.
    ///
    /// Builtins write their normal output to `stdout`; external programs
    /// inherit the shell's own streams. An `Err` is reported by the caller
    /// and does not stop the shell.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
