use crate::command::{CommandFactory, Flow};
use crate::editor::LineEditor;
use crate::env::Environment;
use crate::error::EditorError;
use crate::history::History;
use crate::lexer;
use crate::terminal::TerminalMode;
use std::io::{Read, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and `ExternalCommand`.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The command dispatcher and read-eval loop.
///
/// The interpreter owns the [`Environment`] for the whole session and a list of
/// [`CommandFactory`] objects queried in order to create a command by name.
/// See [`Interpreter::with_history`] for the builtins included out of the box.
///
/// Example
/// ```
/// use lsh::{Flow, History, Interpreter};
/// let mut sh = Interpreter::with_history(History::new(10));
/// let mut out = Vec::new();
/// let flow = sh.execute_with_output(&["echo", "hello", "world"], &mut out, &mut std::io::sink());
/// assert_eq!(flow, Flow::Continue);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>, history: History) -> Self {
        Self {
            env: Environment::new(history),
            commands,
        }
    }

    /// The default command set, remembering commands in `history`.
    pub fn with_history(history: History) -> Self {
        Self::new(default_commands(), history)
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Factories are tried in order; the first one that recognizes `name` wins.
    pub fn run(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
    ) -> anyhow::Result<Flow> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(stdout, &mut self.env);
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Execute a tokenized line with the process's own output streams.
    pub fn execute(&mut self, tokens: &[&str]) -> Flow {
        self.execute_with_output(tokens, &mut std::io::stdout(), &mut std::io::stderr())
    }

    /// Execute a tokenized line.
    ///
    /// The first token names the command and the rest are its arguments. An
    /// empty token list does nothing. Failures are reported on `stderr` and
    /// never stop the loop; only a command that asks to stop does.
    pub fn execute_with_output(
        &mut self,
        tokens: &[&str],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Flow {
        let Some((name, args)) = tokens.split_first() else {
            return Flow::Continue;
        };

        let flow = match self.run(name, args, stdout) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::debug!(command = %name, "command failed: {:#}", e);
                let _ = writeln!(stderr, "lsh: {:#}", e);
                Flow::Continue
            }
        };
        let _ = stdout.flush();
        flow
    }

    /// Read, dispatch, repeat, until a command asks to stop or input ends.
    ///
    /// Only a failure of the line editor itself ends the loop with an error.
    pub fn repl<R, W, T>(&mut self, editor: &mut LineEditor<R, W, T>) -> Result<(), EditorError>
    where
        R: Read,
        W: Write,
        T: TerminalMode,
    {
        loop {
            let Some(line) = editor.read_line(&mut self.env.history, &self.env.current_dir)?
            else {
                tracing::info!("end of input");
                return Ok(());
            };

            let tokens = lexer::split_into_tokens(&line);
            if self.execute(&tokens) == Flow::Stop {
                tracing::info!("exit requested");
                return Ok(());
            }
        }
    }

    pub fn history(&self) -> &History {
        &self.env.history
    }
}

/// The builtins in registry order, with the external launcher last.
fn default_commands() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    use crate::external::ExternalCommand;
    vec![
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Ls>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Clear>::default()),
        Box::new(Factory::<HistoryList>::default()),
        Box::new(Factory::<Cat>::default()),
        Box::new(Factory::<Grep>::default()),
        Box::new(Factory::<Touch>::default()),
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Rm>::default()),
        Box::new(Factory::<ExternalCommand>::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BUILTIN_NAMES;
    use crate::completion::Completer;
    use crate::terminal::NoTerminal;
    use crate::testing::lock_current_dir;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn interp() -> Interpreter {
        let _lock = lock_current_dir();
        Interpreter::with_history(History::new(10))
    }

    fn exec(sh: &mut Interpreter, tokens: &[&str]) -> (Flow, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let flow = sh.execute_with_output(tokens, &mut out, &mut err);
        (
            flow,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_empty_tokens_continue_silently() {
        let mut sh = interp();
        assert_eq!(exec(&mut sh, &[]), (Flow::Continue, String::new(), String::new()));
    }

    #[test]
    fn test_exit_stops() {
        let mut sh = interp();
        assert_eq!(exec(&mut sh, &["exit"]).0, Flow::Stop);
        assert_eq!(exec(&mut sh, &["exit", "3"]).0, Flow::Stop);
    }

    #[test]
    fn test_every_registered_name_dispatches_to_a_builtin() {
        let sh = interp();
        let builtins = &sh.commands[..sh.commands.len() - 1];
        assert_eq!(builtins.len(), BUILTIN_NAMES.len());
        for (factory, name) in builtins.iter().zip(BUILTIN_NAMES) {
            assert!(
                factory.try_create(&sh.env, name, &["--help"]).is_some(),
                "{name} is not handled by its registry slot"
            );
        }
    }

    #[test]
    fn test_builtin_error_is_reported_and_loop_continues() {
        let mut sh = interp();
        let (flow, out, err) = exec(&mut sh, &["cd"]);
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
        assert_eq!(err, "lsh: expected argument to \"cd\"\n");
    }

    #[test]
    fn test_bad_builtin_flag_is_reported() {
        let mut sh = interp();
        let (flow, _, err) = exec(&mut sh, &["ls", "--bogus"]);
        assert_eq!(flow, Flow::Continue);
        assert!(err.starts_with("lsh: "));
    }

    #[test]
    fn test_builtin_help_goes_to_stdout() {
        let mut sh = interp();
        let (flow, out, err) = exec(&mut sh, &["grep", "--help"]);
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("Usage: grep"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_unknown_program_is_reported() {
        let mut sh = interp();
        let (flow, _, err) = exec(&mut sh, &["definitely-not-a-program-lsh"]);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(err, "lsh: command not found: definitely-not-a-program-lsh\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_external_program_runs_to_completion() {
        let mut sh = interp();
        let (flow, _, err) = exec(&mut sh, &["true"]);
        assert_eq!(flow, Flow::Continue);
        assert!(err.is_empty());

        let (flow, _, err) = exec(&mut sh, &["false"]);
        assert_eq!(flow, Flow::Continue);
        assert!(err.is_empty());
    }

    #[test]
    fn test_history_builtin_sees_engine_history() {
        let mut sh = interp();
        sh.env.history.append("pwd");
        let (_, out, _) = exec(&mut sh, &["history"]);
        assert_eq!(out, "1 pwd\n");
    }

    #[test]
    fn test_repl_runs_until_exit() {
        let dir = tempdir().unwrap();
        let mut sh = interp();
        sh.env.current_dir = dir.path().to_path_buf();

        let mut editor = LineEditor::new(
            Cursor::new(b"touch made\n\nexit\nrm made\n".to_vec()),
            Vec::new(),
            NoTerminal,
            "> ",
            Completer::new(BUILTIN_NAMES),
        );
        sh.repl(&mut editor).unwrap();

        assert!(dir.path().join("made").exists());
        assert_eq!(
            sh.history().iter().collect::<Vec<_>>(),
            vec!["touch made", "exit"]
        );
    }

    #[test]
    fn test_repl_stops_at_end_of_input() {
        let dir = tempdir().unwrap();
        let mut sh = interp();
        sh.env.current_dir = dir.path().to_path_buf();

        let mut editor = LineEditor::new(
            Cursor::new(b"touch a\ntouch b".to_vec()),
            Vec::new(),
            NoTerminal,
            "> ",
            Completer::new(BUILTIN_NAMES),
        );
        sh.repl(&mut editor).unwrap();

        assert!(dir.path().join("a").exists());
        assert!(!dir.path().join("b").exists());
    }
}
