//! Tab completion over builtin names and the current directory.

use std::fs;
use std::path::Path;

/// Listed by `readdir` but never by `read_dir`.
const SELF_AND_PARENT: [&str; 2] = [".", ".."];

/// Produces completion candidates for a partially typed word.
#[derive(Debug, Clone, Copy)]
pub struct Completer {
    builtins: &'static [&'static str],
}

impl Completer {
    pub fn new(builtins: &'static [&'static str]) -> Self {
        Self { builtins }
    }

    /// Every builtin name, then every entry of `dir`, that starts with `partial`.
    ///
    /// Builtins come in registry order, then `.` and `..`, then directory
    /// entries in the order the filesystem enumerates them. `dir` is read on
    /// every call since the working directory can change between calls.
    /// Hidden entries are included. An unreadable directory contributes
    /// nothing.
    pub fn complete(&self, partial: &str, dir: &Path) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .builtins
            .iter()
            .filter(|name| name.starts_with(partial))
            .map(|name| name.to_string())
            .collect();

        match fs::read_dir(dir) {
            Ok(entries) => {
                let names = SELF_AND_PARENT.iter().map(|s| s.to_string()).chain(
                    entries
                        .filter_map(Result::ok)
                        .map(|entry| entry.file_name().to_string_lossy().into_owned()),
                );
                candidates.extend(names.filter(|name| name.starts_with(partial)));
            }
            Err(e) => {
                tracing::debug!(dir = %dir.display(), "completion skipped directory: {}", e);
            }
        }

        candidates
    }
}
