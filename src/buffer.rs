//! Growable accumulation buffer for text fed to [`crate::reader::RawReader`].
//!
//! Text is appended wholesale by [`Buffer::push`] and consumed one `char`
//! at a time by the state machine, which lets the reader suspend and
//! resume at any character boundary regardless of how input is chunked.
//! The consumed prefix is periodically drained once it grows large
//! relative to the live tail, so long-running readers don't retain every
//! byte they've ever seen.

use alloc::string::String;

const COMPACT_THRESHOLD: usize = 4096;

#[derive(Debug, Default)]
pub(crate) struct Buffer {
    data: String,
    pos: usize,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self {
            data: String::new(),
            pos: 0,
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.data.push_str(text);
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.data[self.pos..].chars().next()
    }

    pub(crate) fn consume(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        self.maybe_compact();
        Some(ch)
    }

    fn maybe_compact(&mut self) {
        if self.pos > COMPACT_THRESHOLD && self.pos * 2 > self.data.len() {
            self.data.drain(..self.pos);
            self.pos = 0;
        }
    }
}
