use crate::history::History;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// State the engine owns for the whole session and lends to commands.
///
/// The environment contains:
/// - `vars`: environment variables used to resolve programs and visible to them.
/// - `current_dir`: the working directory for completion and command execution.
/// - `history`: every command submitted so far, up to its capacity.
///
/// Fields are public so builtins can reach them directly.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Commands entered in this and previous sessions.
    pub history: History,
}

impl Environment {
    /// Capture the current process state, with `history` as the command log.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new(history: History) -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            history,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// `path` as seen from the current directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use crate::history::History;
    use crate::testing::lock_current_dir;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn test_env_reads_from_process_env() {
        let env = {
            let _lock = lock_current_dir();
            Environment::new(History::new(4))
        };
        assert!(env.get_var("PATH").is_some());
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);
    }

    #[test]
    fn test_own_vars_shadow_process_env() {
        let env = Environment {
            vars: HashMap::from([("PATH".to_string(), "/only/here".to_string())]),
            current_dir: PathBuf::from("/"),
            history: History::new(4),
        };
        assert_eq!(env.get_var("PATH").as_deref(), Some("/only/here"));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let env = Environment {
            vars: HashMap::new(),
            current_dir: PathBuf::from("/work"),
            history: History::new(4),
        };
        assert_eq!(env.resolve("notes.txt"), PathBuf::from("/work/notes.txt"));
        assert_eq!(env.resolve("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }
}
