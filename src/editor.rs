//! Raw-mode line editor.
//!
//! Reads one keystroke at a time, echoes what it accepts and redraws the line
//! itself when history recall or completion replaces the text. The terminal
//! is in raw mode only while a line is being read.

use crate::completion::Completer;
use crate::error::EditorError;
use crate::history::History;
use crate::keys::{Key, KeyReader};
use crate::line_buffer::LineBuffer;
use crate::terminal::{RawModeGuard, TerminalMode};
use std::io::{self, Read, Write};
use std::path::Path;

/// Erase from the cursor to the end of the line.
const CLEAR_TO_EOL: &[u8] = b"\x1b[K";

/// Move back one column, blank it, move back again.
const RUB_OUT: &[u8] = b"\x08 \x08";

pub struct LineEditor<R, W, T> {
    keys: KeyReader<R>,
    output: W,
    terminal: T,
    prompt: String,
    completer: Completer,
}

impl<R: Read, W: Write, T: TerminalMode> LineEditor<R, W, T> {
    pub fn new(
        input: R,
        output: W,
        terminal: T,
        prompt: impl Into<String>,
        completer: Completer,
    ) -> Self {
        Self {
            keys: KeyReader::new(input),
            output,
            terminal,
            prompt: prompt.into(),
            completer,
        }
    }

    /// Prompt for and read one line.
    ///
    /// Up and down walk through `history`; tab completes against builtin
    /// names and the entries of `cwd`. A non-empty submitted line is appended
    /// to `history` before it is returned. `Ok(None)` means the input ended.
    ///
    /// The terminal is back in cooked mode when this returns, whatever the
    /// outcome.
    pub fn read_line(
        &mut self,
        history: &mut History,
        cwd: &Path,
    ) -> Result<Option<String>, EditorError> {
        self.output.write_all(self.prompt.as_bytes())?;
        self.output.flush()?;

        let mut buffer = LineBuffer::new()?;
        // Ranges over 0..=len; len is the fresh line.
        let mut cursor = history.len();

        let raw = RawModeGuard::enter(&mut self.terminal)?;
        let out = &mut self.output;
        let prompt = self.prompt.as_str();

        loop {
            match self.keys.next_key()? {
                Key::Enter => {
                    out.write_all(b"\n")?;
                    out.flush()?;
                    drop(raw);
                    let line = buffer.into_string();
                    history.append(&line);
                    return Ok(Some(line));
                }
                Key::Eof => {
                    out.write_all(b"\n")?;
                    out.flush()?;
                    tracing::debug!("input closed while reading a line");
                    return Ok(None);
                }
                Key::CtrlD if buffer.is_empty() => {
                    out.write_all(b"\n")?;
                    out.flush()?;
                    return Ok(None);
                }
                Key::CtrlC => {
                    out.write_all(b"^C\n")?;
                    out.flush()?;
                    return Ok(Some(String::new()));
                }
                Key::Up => {
                    if cursor > 0 {
                        cursor -= 1;
                        recall(out, prompt, &mut buffer, history.get(cursor))?;
                    }
                }
                Key::Down => {
                    if cursor + 1 < history.len() {
                        cursor += 1;
                        recall(out, prompt, &mut buffer, history.get(cursor))?;
                    } else {
                        cursor = history.len();
                        buffer.clear();
                        redraw(out, prompt, buffer.as_bytes())?;
                    }
                }
                Key::Tab => {
                    let partial = buffer.text();
                    let candidates = self.completer.complete(&partial, cwd);
                    if let Some(first) = candidates.first() {
                        if candidates.len() > 1 {
                            list_candidates(out, prompt, &partial, &candidates)?;
                        }
                        buffer.replace(first)?;
                        redraw(out, prompt, buffer.as_bytes())?;
                    }
                }
                Key::Backspace => {
                    if buffer.pop_char() {
                        out.write_all(RUB_OUT)?;
                    }
                }
                Key::Char(byte) => {
                    buffer.push(byte)?;
                    out.write_all(&[byte])?;
                }
                Key::CtrlD | Key::Ignored => {}
            }
            out.flush()?;
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}

fn recall(
    out: &mut impl Write,
    prompt: &str,
    buffer: &mut LineBuffer,
    entry: Option<&str>,
) -> Result<(), EditorError> {
    buffer.replace(entry.unwrap_or_default())?;
    redraw(out, prompt, buffer.as_bytes())?;
    Ok(())
}

fn redraw(out: &mut impl Write, prompt: &str, text: &[u8]) -> io::Result<()> {
    out.write_all(b"\r")?;
    out.write_all(prompt.as_bytes())?;
    out.write_all(text)?;
    out.write_all(CLEAR_TO_EOL)
}

/// Print all candidates below the line, then the prompt and the partial text again.
fn list_candidates(
    out: &mut impl Write,
    prompt: &str,
    partial: &str,
    candidates: &[String],
) -> io::Result<()> {
    out.write_all(b"\n")?;
    for c in candidates {
        write!(out, "{} ", c)?;
    }
    write!(out, "\n{}{}", prompt, partial)
}
