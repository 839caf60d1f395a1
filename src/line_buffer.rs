//! Growable edit buffer for a single input line.

use std::collections::TryReserveError;

/// Capacity of a fresh buffer, and the step it grows by.
pub const GROWTH_STEP: usize = 1024;

/// Bytes typed so far on the current line.
///
/// The insertion point is always the end of the text. `capacity` is the
/// logical backing size: it starts at [`GROWTH_STEP`], grows by the same step
/// whenever an insert or replacement would not fit, and never shrinks while
/// the line is being edited.
#[derive(Debug)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new() -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(GROWTH_STEP)?;
        Ok(Self {
            bytes,
            capacity: GROWTH_STEP,
        })
    }

    /// Append one byte at the insertion point.
    pub fn push(&mut self, byte: u8) -> Result<(), TryReserveError> {
        self.ensure_capacity(self.bytes.len() + 1)?;
        self.bytes.push(byte);
        Ok(())
    }

    /// Remove the last character, which may span several UTF-8 bytes.
    ///
    /// Returns `false` when the buffer was already empty.
    pub fn pop_char(&mut self) -> bool {
        let Some(last) = self.bytes.pop() else {
            return false;
        };
        if last >= 0x80 {
            // Drop continuation bytes up to and including the lead byte.
            let mut byte = last;
            while byte & 0xC0 == 0x80 {
                match self.bytes.pop() {
                    Some(b) => byte = b,
                    None => break,
                }
            }
        }
        true
    }

    /// Replace the whole contents, growing first when `text` does not fit.
    pub fn replace(&mut self, text: &str) -> Result<(), TryReserveError> {
        self.ensure_capacity(text.len())?;
        self.bytes.clear();
        self.bytes.extend_from_slice(text.as_bytes());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Current text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Insertion point, which is also the length of the text.
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Finish editing and hand the text to the caller.
    pub fn into_string(self) -> String {
        match String::from_utf8(self.bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }

    fn ensure_capacity(&mut self, needed: usize) -> Result<(), TryReserveError> {
        if needed <= self.capacity {
            return Ok(());
        }
        let mut target = self.capacity;
        while target < needed {
            target += GROWTH_STEP;
        }
        self.bytes.try_reserve_exact(target - self.bytes.len())?;
        tracing::trace!(from = self.capacity, to = target, "edit buffer grown");
        self.capacity = target;
        Ok(())
    }
}
