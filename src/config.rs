use std::path::{Path, PathBuf};

/// Name of the history file created in the directory the shell was started from.
pub const DEFAULT_HISTORY_FILE: &str = ".shell_history";

/// Number of commands kept in history unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Prompt written before every line.
pub const DEFAULT_PROMPT: &str = "> ";

/// Startup configuration of a shell session.
///
/// Built once in `main` and consumed while constructing the engine; nothing
/// reads it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute location of the persisted history.
    pub history_file: PathBuf,
    /// Maximum number of remembered commands. Zero disables history.
    pub history_capacity: usize,
    pub prompt: String,
}

impl Config {
    /// Defaults relative to `invocation_dir`.
    ///
    /// The history path is fixed here so that `cd` later in the session does
    /// not change where history gets written.
    pub fn new(invocation_dir: &Path) -> Self {
        Self {
            history_file: invocation_dir.join(DEFAULT_HISTORY_FILE),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Override the history location. Relative paths are taken from `invocation_dir`.
    pub fn with_history_file(mut self, invocation_dir: &Path, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.history_file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            invocation_dir.join(path)
        };
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}
