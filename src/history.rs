//! Bounded command history.
//!
//! Entries are kept oldest first. Once the store is full every new command
//! pushes the oldest one out, so the store always holds the most recent
//! `capacity` commands in the order they were entered.

use crate::error::HistoryError;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Record a submitted command line.
    ///
    /// Empty lines are ignored. When the store is full the oldest entry is
    /// evicted before the new one goes in.
    pub fn append(&mut self, line: &str) {
        if line.is_empty() || self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(evicted = %evicted, "history full, dropping oldest entry");
            }
        }
        self.entries.push_back(line.to_owned());
    }

    /// Append every line of the file at `path`, oldest first.
    ///
    /// A missing file is not an error and leaves the store untouched. Returns
    /// the number of lines read, which may exceed what is kept when the file
    /// is longer than the capacity.
    pub fn load(&mut self, path: &Path) -> Result<usize, HistoryError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no history file yet");
                return Ok(0);
            }
            Err(source) => {
                return Err(HistoryError::Load {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();
        let mut read = 0;
        loop {
            raw.clear();
            let n = reader
                .read_until(b'\n', &mut raw)
                .map_err(|source| HistoryError::Load {
                    path: path.to_path_buf(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            if raw.last() == Some(&b'\n') {
                raw.pop();
            }
            self.append(&String::from_utf8_lossy(&raw));
            read += 1;
        }

        tracing::info!(path = %path.display(), read, kept = self.len(), "history loaded");
        Ok(read)
    }

    /// Overwrite `path` with the current entries, one per line, oldest first.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let to_err = |source| HistoryError::Save {
            path: path.to_path_buf(),
            source,
        };

        let mut out = BufWriter::new(File::create(path).map_err(to_err)?);
        for entry in &self.entries {
            writeln!(out, "{}", entry).map_err(to_err)?;
        }
        out.flush().map_err(to_err)?;

        tracing::info!(path = %path.display(), saved = self.len(), "history saved");
        Ok(())
    }

    /// Entries paired with their 1-based display number.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i + 1, entry.as_str()))
    }

    /// Entry at `index`, where 0 is the oldest.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn history_of(capacity: usize, lines: &[&str]) -> History {
        let mut h = History::new(capacity);
        for l in lines {
            h.append(l);
        }
        h
    }

    #[test]
    fn test_empty_line_is_ignored() {
        let mut h = history_of(4, &["ls"]);
        h.append("");
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_oldest_is_evicted_when_full() {
        let h = history_of(3, &["a", "b", "c", "d", "e"]);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["c", "d", "e"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let h = history_of(0, &["a", "b"]);
        assert!(h.is_empty());
    }

    #[test]
    fn test_list_is_one_indexed() {
        let h = history_of(10, &["ls", "pwd"]);
        assert_eq!(h.list().collect::<Vec<_>>(), vec![(1, "ls"), (2, "pwd")]);
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let mut h = History::new(10);
        let read = h.load(&dir.path().join(".shell_history")).unwrap();
        assert_eq!(read, 0);
        assert!(h.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".shell_history");
        let original = history_of(10, &["ls -a", "cd src", "grep main lib.rs"]);
        original.save(&path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "ls -a\ncd src\ngrep main lib.rs\n"
        );

        let mut restored = History::new(10);
        restored.load(&path).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_load_longer_file_keeps_newest_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist");
        std::fs::write(&path, "one\ntwo\n\nthree\nfour").unwrap();

        let mut h = History::new(2);
        let read = h.load(&path).unwrap();
        assert_eq!(read, 5);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["three", "four"]);
    }

    #[test]
    fn test_save_into_missing_directory_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("hist");
        let err = history_of(2, &["ls"]).save(&path).unwrap_err();
        assert!(matches!(err, HistoryError::Save { .. }));
        assert!(err.to_string().contains("missing"));
    }

    proptest! {
        #[test]
        fn prop_history_holds_last_capacity_lines(
            capacity in 1usize..16,
            lines in proptest::collection::vec("[a-z]{1,6}", 0..64),
        ) {
            let mut h = History::new(capacity);
            for l in &lines {
                h.append(l);
            }
            let expected: Vec<&str> = lines
                .iter()
                .skip(lines.len().saturating_sub(capacity))
                .map(String::as_str)
                .collect();
            prop_assert_eq!(h.len(), lines.len().min(capacity));
            prop_assert_eq!(h.iter().collect::<Vec<_>>(), expected);
        }
    }
}
