use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use regex::RegexBuilder;
use std::env;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};

/// Names of all builtins in registry order.
///
/// Dispatch, tab completion and `help` all enumerate builtins in this order.
pub const BUILTIN_NAMES: &[&str] = &[
    "cd", "help", "exit", "ls", "pwd", "clear", "history", "cat", "grep", "touch", "echo", "rm",
];

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command, writing regular output to `stdout`.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        T::execute(*self, stdout, env)
    }
}

/// Result of argument parsing that stopped early: `--help` output or a usage error.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        if self.is_error {
            return Err(anyhow!("{}", self.output.trim_end()));
        }
        stdout.write_all(self.output.as_bytes())?;
        Ok(Flow::Continue)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

fn missing_argument(what: &str) -> anyhow::Error {
    anyhow!("{what}")
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let target = match self.target.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(missing_argument("expected argument to \"cd\"")),
        };

        let new_dir = env.resolve(target);
        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Show the list of builtin commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        writeln!(stdout, "lsh: a small interactive shell")?;
        writeln!(stdout, "Type program names and arguments, and hit enter.")?;
        writeln!(stdout, "The following are built in:")?;
        for name in BUILTIN_NAMES {
            writeln!(stdout, " {}", name)?;
        }
        writeln!(stdout, "Use the man command for information on other programs.")?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always exits successfully.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        Ok(Flow::Stop)
    }
}

#[derive(FromArgs)]
/// List directory entries, one per line.
pub struct Ls {
    #[argh(switch, short = 'a')]
    /// include entries whose names start with '.'.
    pub all: bool,

    #[argh(positional)]
    /// directory to list. Defaults to the current directory.
    pub dir: Option<String>,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let dir = env.resolve(self.dir.as_deref().unwrap_or("."));
        let entries =
            fs::read_dir(&dir).with_context(|| format!("ls: {}", dir.display()))?;

        for entry in entries {
            let entry = entry.with_context(|| format!("ls: {}", dir.display()))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') && !self.all {
                continue;
            }
            writeln!(stdout, "{}", name)?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Clear the screen and move the cursor to the top left corner.
pub struct Clear {}

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "clear"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        stdout.write_all(b"\x1b[2J\x1b[H")?;
        stdout.flush()?;
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Print the command history, oldest first.
pub struct HistoryList {}

impl BuiltinCommand for HistoryList {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        for (n, command) in env.history.list() {
            writeln!(stdout, "{} {}", n, command)?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Print file(s) to standard output.
pub struct Cat {
    #[argh(positional, greedy)]
    /// files to print, in order.
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        if self.files.is_empty() {
            return Err(missing_argument("expected argument to \"cat\""));
        }
        for fname in &self.files {
            let mut f = fs::File::open(env.resolve(fname))
                .with_context(|| format!("cat: {}", fname))?;
            io::copy(&mut f, stdout)?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Print the lines of a file that contain a pattern, with their line numbers.
pub struct Grep {
    #[argh(switch, short = 'i')]
    /// ignore case distinctions.
    pub ignore_case: bool,

    #[argh(switch, short = 'E')]
    /// interpret the pattern as a regular expression instead of plain text.
    pub extended_regexp: bool,

    #[argh(positional, greedy)]
    /// the text to search for, then the file to search.
    pub args: Vec<String>,
}

impl BuiltinCommand for Grep {
    fn name() -> &'static str {
        "grep"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let [pattern, file] = self.args.as_slice() else {
            return Err(missing_argument("grep requires pattern and filename"));
        };

        let source = if self.extended_regexp {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        let re = RegexBuilder::new(&source)
            .case_insensitive(self.ignore_case)
            .build()
            .with_context(|| format!("grep: invalid pattern: {}", pattern))?;

        let f = fs::File::open(env.resolve(file)).with_context(|| format!("grep: {}", file))?;
        let mut reader = BufReader::new(f);
        let mut raw = Vec::new();
        let mut line_number = 0;
        loop {
            raw.clear();
            let n = reader
                .read_until(b'\n', &mut raw)
                .with_context(|| format!("grep: {}", file))?;
            if n == 0 {
                break;
            }
            line_number += 1;
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches('\n');
            if re.is_match(line) {
                writeln!(stdout, "{}: {}", line_number, line)?;
            }
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Create a file if it does not exist. Existing files are left untouched.
pub struct Touch {
    #[argh(positional)]
    /// the file to create.
    pub file: Option<String>,
}

impl BuiltinCommand for Touch {
    fn name() -> &'static str {
        "touch"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let Some(file) = self.file.as_deref() else {
            return Err(missing_argument("touch requires a filename"));
        };
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(env.resolve(file))
            .with_context(|| format!("touch: {}", file))?;
        Ok(Flow::Continue)
    }
}

/// Write the arguments to standard output, separated by spaces.
///
/// `> file` at the end writes them to the file instead. A leading `-n` drops
/// the trailing newline; every other argument is printed as given, flags
/// and `--help` included.
pub struct Echo {
    pub no_newline: bool,
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let (no_newline, words) = match args.split_first() {
            Some((&"-n", rest)) => (true, rest),
            _ => (false, args),
        };
        Ok(Self {
            no_newline,
            args: words.iter().map(|w| w.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let split = self.args.iter().position(|a| a == ">");
        let words = &self.args[..split.unwrap_or(self.args.len())];
        let target = split.and_then(|i| self.args.get(i + 1));

        if let Some(target) = target {
            let mut f = fs::File::create(env.resolve(target))
                .with_context(|| format!("echo: {}", target))?;
            for word in words {
                write!(f, "{} ", word)?;
            }
            return Ok(Flow::Continue);
        }

        let s = words.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs)]
/// Remove a file.
pub struct Rm {
    #[argh(positional)]
    /// the file to remove.
    pub file: Option<String>,
}

impl BuiltinCommand for Rm {
    fn name() -> &'static str {
        "rm"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let Some(file) = self.file.as_deref() else {
            return Err(missing_argument("rm requires a filename"));
        };
        fs::remove_file(env.resolve(file)).with_context(|| format!("rm: {}", file))?;
        Ok(Flow::Continue)
    }
}
