use argh::FromArgs;
use lsh::config::{Config, DEFAULT_HISTORY_CAPACITY};
use lsh::terminal::{NoTerminal, TerminalMode};
use lsh::{BUILTIN_NAMES, Completer, EditorError, History, Interpreter, LineEditor};
use std::fs::File;
use std::io;
#[cfg(unix)]
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `LSH_LOG=lsh=trace`.
const LOG_ENV: &str = "LSH_LOG";

#[derive(FromArgs)]
/// An interactive shell with history recall and tab completion.
struct Args {
    #[argh(option)]
    /// file to keep command history in. Defaults to .shell_history in the starting directory.
    history_file: Option<PathBuf>,

    #[argh(option, default = "DEFAULT_HISTORY_CAPACITY")]
    /// how many commands to remember.
    history_size: usize,

    #[argh(option)]
    /// text shown before every line.
    prompt: Option<String>,

    #[argh(option)]
    /// write diagnostics to this file instead of stderr.
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_tracing(args.log_file.as_deref());

    let invocation_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = Config::new(&invocation_dir).with_history_capacity(args.history_size);
    if let Some(path) = &args.history_file {
        config = config.with_history_file(&invocation_dir, path);
    }
    if let Some(prompt) = args.prompt {
        config = config.with_prompt(prompt);
    }
    tracing::debug!(?config, "starting");

    let mut history = History::new(config.history_capacity);
    if let Err(e) = history.load(&config.history_file) {
        tracing::warn!("{}", e);
    }

    let mut shell = Interpreter::with_history(history);
    let result = run(&mut shell, &config);

    if let Err(e) = shell.history().save(&config.history_file) {
        eprintln!("lsh: {}", e);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lsh: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(unix)]
fn run(shell: &mut Interpreter, config: &Config) -> Result<(), EditorError> {
    if io::stdin().is_terminal() {
        repl_with(shell, config, lsh::terminal::StdinTerminal::new())
    } else {
        repl_with(shell, config, NoTerminal)
    }
}

#[cfg(not(unix))]
fn run(shell: &mut Interpreter, config: &Config) -> Result<(), EditorError> {
    repl_with(shell, config, NoTerminal)
}

fn repl_with<T: TerminalMode>(
    shell: &mut Interpreter,
    config: &Config,
    terminal: T,
) -> Result<(), EditorError> {
    let mut editor = LineEditor::new(
        io::stdin().lock(),
        io::stdout(),
        terminal,
        config.prompt.as_str(),
        Completer::new(BUILTIN_NAMES),
    );
    shell.repl(&mut editor)
}

fn init_tracing(log_file: Option<&Path>) {
    let filter = |default: &str| {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
    };

    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter("debug"))
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .try_init();
                return;
            }
            Err(e) => eprintln!("lsh: can't open log file {}: {}", path.display(), e),
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(io::stderr)
        .try_init();
}
