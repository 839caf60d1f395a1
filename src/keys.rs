//! Keystroke decoding from a raw byte stream.

use std::io::{self, ErrorKind, Read};

const ESC: u8 = 0x1b;
const BACKSPACE: u8 = 0x7f;
const CTRL_H: u8 = 0x08;
const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;

/// First byte value treated as printable input.
const PRINTABLE_START: u8 = b' ';

/// A decoded keystroke, as far as the line editor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Tab,
    Backspace,
    /// Ctrl-C: abandon the current line.
    CtrlC,
    /// Ctrl-D: end of input when the line is empty.
    CtrlD,
    /// A byte that goes into the buffer. Bytes of multi-byte UTF-8 characters
    /// arrive one at a time.
    Char(u8),
    /// Escape sequence or control byte without meaning here.
    Ignored,
    /// The input stream is exhausted.
    Eof,
}

/// Reads one keystroke at a time from `R`, blocking until a byte is available.
pub struct KeyReader<R> {
    input: R,
}

impl<R: Read> KeyReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    pub fn next_key(&mut self) -> io::Result<Key> {
        let Some(byte) = self.read_byte()? else {
            return Ok(Key::Eof);
        };

        Ok(match byte {
            ESC => self.read_escape()?,
            b'\n' | b'\r' => Key::Enter,
            b'\t' => Key::Tab,
            BACKSPACE | CTRL_H => Key::Backspace,
            CTRL_C => Key::CtrlC,
            CTRL_D => Key::CtrlD,
            b if b >= PRINTABLE_START => Key::Char(b),
            _ => Key::Ignored,
        })
    }

    /// Decode the two bytes following ESC.
    ///
    /// A stream that ends inside the sequence aborts it; the end of input is
    /// then reported by the next read.
    fn read_escape(&mut self) -> io::Result<Key> {
        let Some(intro) = self.read_byte()? else {
            tracing::debug!("input ended inside escape sequence");
            return Ok(Key::Ignored);
        };
        let Some(code) = self.read_byte()? else {
            tracing::debug!("input ended inside escape sequence");
            return Ok(Key::Ignored);
        };

        Ok(match (intro, code) {
            (b'[' | b'O', b'A') => Key::Up,
            (b'[' | b'O', b'B') => Key::Down,
            _ => {
                tracing::trace!(intro, code, "ignoring escape sequence");
                Key::Ignored
            }
        })
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
