//! Blocking [`std::io::Write`] support for [`super::RawWriter`].

use std::io::{self, Write};

use thiserror::Error;

use super::{RawWriter, Sink, WriterOptions};

/// Wraps an [`io::Error`] raised while flushing a [`RawWriter`]'s
/// [`IoSink`] to its underlying writer.
///
/// Per the sink-buffering contract, individual event calls
/// (`primitive`, `key`, `object_begin`, ...) stay infallible; I/O
/// failures surface only here, at [`RawWriter::flush`] or
/// [`RawWriter::into_inner`] time.
#[derive(Debug, Error)]
#[error("I/O error writing luxem output: {0}")]
pub struct WriterIoError(#[from] io::Error);

/// A [`Sink`] that writes every fragment straight through to an
/// underlying [`std::io::Write`], retrying short writes until each
/// fragment is fully consumed.
///
/// The first write error is latched and returned by
/// [`RawWriter::flush`]/[`RawWriter::into_inner`]; once latched,
/// further fragments are silently dropped rather than attempted again,
/// since the underlying writer is presumed broken.
#[derive(Debug)]
pub struct IoSink<W: Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> IoSink<W> {
    fn write_all_retrying(&mut self, mut text: &[u8]) {
        while !text.is_empty() {
            match self.inner.write(text) {
                Ok(0) => {
                    self.error = Some(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "writer returned Ok(0)",
                    ));
                    return;
                }
                Ok(n) => text = &text[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.error = Some(e);
                    return;
                }
            }
        }
    }
}

impl<W: Write> Sink for IoSink<W> {
    fn write_text(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        self.write_all_retrying(text.as_bytes());
    }
}

impl<W: Write> RawWriter<IoSink<W>> {
    /// Creates a writer that writes each fragment straight through to
    /// `writer` as it is produced.
    #[must_use]
    pub fn with_writer(writer: W, options: WriterOptions) -> Self {
        Self::new(
            IoSink {
                inner: writer,
                error: None,
            },
            options,
        )
    }

    /// Flushes the underlying writer and reports the first I/O error
    /// latched since construction, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WriterIoError`] if a previous fragment write failed, or
    /// if flushing the underlying writer fails.
    pub fn flush(&mut self) -> Result<(), WriterIoError> {
        if let Some(e) = self.sink.error.take() {
            return Err(WriterIoError(e));
        }
        self.sink.inner.flush().map_err(WriterIoError)
    }

    /// Flushes and consumes the writer, returning the underlying
    /// [`std::io::Write`] on success.
    ///
    /// # Errors
    ///
    /// Returns [`WriterIoError`] under the same conditions as
    /// [`RawWriter::flush`].
    pub fn into_inner(mut self) -> Result<W, WriterIoError> {
        self.flush()?;
        Ok(self.sink.inner)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::writer::WriterOptions;

    #[test]
    fn writes_through_to_the_underlying_writer() {
        let mut out: Vec<u8> = Vec::new();
        {
            let mut writer = RawWriter::with_writer(&mut out, WriterOptions::default());
            writer.primitive("7").unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(out, b"7,");
    }

    #[test]
    fn into_inner_returns_the_writer() {
        let out: Vec<u8> = Vec::new();
        let mut writer = RawWriter::with_writer(out, WriterOptions::default());
        writer.primitive("7").unwrap();
        let out = writer.into_inner().unwrap();
        assert_eq!(out, b"7,");
    }
}
