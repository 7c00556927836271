//! Output destinations for [`super::RawWriter`].
//!
//! A [`Sink`] receives fragments of output text as the writer produces
//! them; it makes no guarantee about fragment size or boundary, only
//! that fragments arrive in the order they were written (per the
//! ordering guarantee in the format's concurrency model).

use alloc::string::String;

/// A destination for the text fragments a [`super::RawWriter`] produces.
pub trait Sink {
    /// Appends `text` to the sink. Called once per token or punctuation
    /// mark; implementations must not reorder or drop fragments.
    fn write_text(&mut self, text: &str);
}

/// A [`Sink`] that accumulates everything written into an in-memory
/// [`String`], retrievable with [`RawWriter::dump`](super::RawWriter::dump).
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: String,
}

impl BufferSink {
    pub(crate) fn into_string(self) -> String {
        self.buffer
    }
}

impl Sink for BufferSink {
    fn write_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// A [`Sink`] that forwards every fragment to a user-supplied closure.
pub struct CallbackSink<F: FnMut(&str)> {
    callback: F,
}

impl<F: FnMut(&str)> CallbackSink<F> {
    pub(crate) fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(&str)> Sink for CallbackSink<F> {
    fn write_text(&mut self, text: &str) {
        (self.callback)(text);
    }
}

impl<F: FnMut(&str)> core::fmt::Debug for CallbackSink<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackSink").finish_non_exhaustive()
    }
}
