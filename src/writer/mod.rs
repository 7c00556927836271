//! The streaming pull emitter.
//!
//! [`RawWriter`] mirrors the event vocabulary consumed from
//! [`crate::reader::RawReader`]: each call (`key`, `r#type`, `primitive`,
//! `object_begin`/`object_end`, `array_begin`/`array_end`) writes
//! incrementally to a [`Sink`] and returns `&mut Self`, so calls chain.
//! Illegal call sequences (a second `key()` before a value, an
//! `object_end()` with a key still pending, and so on) return a
//! [`UsageError`] instead of panicking.

use alloc::{string::String, vec::Vec};

use crate::error::UsageError;

mod sink;
pub use sink::{BufferSink, CallbackSink, Sink};

#[cfg(feature = "std")]
mod io_sink;
#[cfg(feature = "std")]
pub use io_sink::{IoSink, WriterIoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object { need_value: bool },
    Array,
}

/// Pretty-printing configuration for a [`RawWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Emit newlines and indentation between sibling values.
    pub pretty: bool,
    /// Indent with spaces (`true`) or tabs (`false`). Ignored unless
    /// `pretty` is set.
    pub use_spaces: bool,
    /// Number of indent characters per nesting level. Ignored unless
    /// `pretty` is set.
    pub indent_width: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            use_spaces: true,
            indent_width: 4,
        }
    }
}

impl WriterOptions {
    /// The default pretty-printing configuration: spaces, four per
    /// level.
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }
}

fn needs_quote(text: &str) -> bool {
    text.is_empty()
        || text.chars().any(|c| {
            matches!(
                c,
                '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' | '"' | '\\'
            ) || c.is_whitespace()
        })
}

fn escape_word(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A streaming pull emitter over a [`Sink`].
#[derive(Debug)]
pub struct RawWriter<S: Sink> {
    sink: S,
    options: WriterOptions,
    stack: Vec<Frame>,
    pending_type: bool,
    pending_newline: bool,
}

impl<S: Sink> RawWriter<S> {
    fn new(sink: S, options: WriterOptions) -> Self {
        Self {
            sink,
            options,
            stack: Vec::new(),
            pending_type: false,
            pending_newline: false,
        }
    }

    fn at_value_position(&self) -> bool {
        match self.stack.last() {
            None => true,
            Some(Frame::Array) => true,
            Some(Frame::Object { need_value }) => *need_value,
        }
    }

    fn write_indent(&mut self, depth: usize) {
        if !self.options.pretty {
            return;
        }
        let unit = if self.options.use_spaces { ' ' } else { '\t' };
        for _ in 0..depth * self.options.indent_width {
            self.sink.write_text(&unit.to_string());
        }
    }

    fn resolve_content_indent(&mut self) {
        if self.options.pretty && self.pending_newline {
            let depth = self.stack.len();
            self.write_indent(depth);
            self.pending_newline = false;
        }
    }

    fn resolve_end_indent(&mut self) {
        if self.options.pretty && self.pending_newline {
            let depth = self.stack.len().saturating_sub(1);
            self.write_indent(depth);
            self.pending_newline = false;
        }
    }

    fn write_word(&mut self, text: &str) {
        if needs_quote(text) {
            self.sink.write_text("\"");
            self.sink.write_text(&escape_word(text));
            self.sink.write_text("\"");
        } else {
            self.sink.write_text(text);
        }
    }

    fn complete_value(&mut self) {
        self.sink.write_text(",");
        if self.options.pretty {
            self.sink.write_text("\n");
            self.pending_newline = true;
        }
        if let Some(Frame::Object { need_value }) = self.stack.last_mut() {
            *need_value = false;
        }
    }

    /// Writes an object member's key. Legal only directly inside an
    /// object, with no key already pending a value.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::KeyOutsideObject`] or
    /// [`UsageError::KeyAlreadyPending`].
    pub fn key(&mut self, name: &str) -> Result<&mut Self, UsageError> {
        match self.stack.last() {
            Some(Frame::Object { need_value: false }) => {}
            Some(Frame::Object { need_value: true }) => {
                return Err(UsageError::KeyAlreadyPending);
            }
            _ => return Err(UsageError::KeyOutsideObject),
        }
        self.resolve_content_indent();
        self.write_word(name);
        self.sink.write_text(":");
        if self.options.pretty {
            self.sink.write_text(" ");
        }
        if let Some(Frame::Object { need_value }) = self.stack.last_mut() {
            *need_value = true;
        }
        Ok(self)
    }

    /// Writes a type tag ahead of the value that follows. Legal
    /// wherever a value is expected, at most once per value.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::TypePending`] or
    /// [`UsageError::ValueNotExpected`].
    pub fn r#type(&mut self, tag: &str) -> Result<&mut Self, UsageError> {
        if self.pending_type {
            return Err(UsageError::TypePending);
        }
        if !self.at_value_position() {
            return Err(UsageError::ValueNotExpected);
        }
        self.resolve_content_indent();
        self.sink.write_text("(");
        self.write_word(tag);
        self.sink.write_text(")");
        if self.options.pretty {
            self.sink.write_text(" ");
        }
        self.pending_type = true;
        Ok(self)
    }

    /// Writes a primitive value word.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ValueNotExpected`].
    pub fn primitive(&mut self, text: &str) -> Result<&mut Self, UsageError> {
        if !self.at_value_position() {
            return Err(UsageError::ValueNotExpected);
        }
        self.resolve_content_indent();
        self.write_word(text);
        self.pending_type = false;
        self.complete_value();
        Ok(self)
    }

    /// Opens an object as a value.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ValueNotExpected`].
    pub fn object_begin(&mut self) -> Result<&mut Self, UsageError> {
        if !self.at_value_position() {
            return Err(UsageError::ValueNotExpected);
        }
        self.resolve_content_indent();
        self.sink.write_text("{");
        self.pending_type = false;
        self.stack.push(Frame::Object { need_value: false });
        if self.options.pretty {
            self.sink.write_text("\n");
            self.pending_newline = true;
        }
        Ok(self)
    }

    /// Opens an array as a value.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ValueNotExpected`].
    pub fn array_begin(&mut self) -> Result<&mut Self, UsageError> {
        if !self.at_value_position() {
            return Err(UsageError::ValueNotExpected);
        }
        self.resolve_content_indent();
        self.sink.write_text("[");
        self.pending_type = false;
        self.stack.push(Frame::Array);
        if self.options.pretty {
            self.sink.write_text("\n");
            self.pending_newline = true;
        }
        Ok(self)
    }

    /// Closes the innermost object.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::PendingAtObjectEnd`] or
    /// [`UsageError::NoMatchingObject`].
    pub fn object_end(&mut self) -> Result<&mut Self, UsageError> {
        match self.stack.last() {
            Some(Frame::Object { need_value: false }) if !self.pending_type => {}
            Some(Frame::Object { .. }) => return Err(UsageError::PendingAtObjectEnd),
            _ => return Err(UsageError::NoMatchingObject),
        }
        self.resolve_end_indent();
        self.sink.write_text("}");
        self.stack.pop();
        self.complete_value();
        Ok(self)
    }

    /// Closes the innermost array.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::PendingAtArrayEnd`] or
    /// [`UsageError::NoMatchingArray`].
    pub fn array_end(&mut self) -> Result<&mut Self, UsageError> {
        match self.stack.last() {
            Some(Frame::Array) if !self.pending_type => {}
            Some(Frame::Array) => return Err(UsageError::PendingAtArrayEnd),
            _ => return Err(UsageError::NoMatchingArray),
        }
        self.resolve_end_indent();
        self.sink.write_text("]");
        self.stack.pop();
        self.complete_value();
        Ok(self)
    }
}

impl RawWriter<BufferSink> {
    /// Creates a writer that accumulates output in an internal buffer.
    #[must_use]
    pub fn buffer(options: WriterOptions) -> Self {
        Self::new(BufferSink::default(), options)
    }

    /// Consumes the writer and returns everything written so far.
    #[must_use]
    pub fn dump(self) -> String {
        self.sink.into_string()
    }
}

impl<F: FnMut(&str)> RawWriter<CallbackSink<F>> {
    /// Creates a writer that calls `callback` with each fragment of
    /// text as it is produced.
    #[must_use]
    pub fn with_callback(callback: F, options: WriterOptions) -> Self {
        Self::new(CallbackSink::new(callback), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(options: WriterOptions, build: impl FnOnce(&mut RawWriter<BufferSink>)) -> String {
        let mut writer = RawWriter::buffer(options);
        build(&mut writer);
        writer.dump()
    }

    #[test]
    fn primitive_compact() {
        let out = dump(WriterOptions::default(), |w| {
            w.primitive("primitive").unwrap();
        });
        assert_eq!(out, "primitive,");
    }

    #[test]
    fn primitive_needing_quotes() {
        let out = dump(WriterOptions::default(), |w| {
            w.primitive("has spaces").unwrap();
        });
        assert_eq!(out, "\"has spaces\",");
    }

    #[test]
    fn primitive_with_embedded_quote() {
        let out = dump(WriterOptions::default(), |w| {
            w.primitive("\"").unwrap();
        });
        assert_eq!(out, "\"\\\"\",");
    }

    #[test]
    fn typed_primitive() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.r#type("type").unwrap().primitive("value").unwrap();
        });
        assert_eq!(out, "(type) value,\n");
    }

    #[test]
    fn empty_object() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.object_begin().unwrap().object_end().unwrap();
        });
        assert_eq!(out, "{\n},\n");
    }

    #[test]
    fn typed_empty_object() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.r#type("type")
                .unwrap()
                .object_begin()
                .unwrap()
                .object_end()
                .unwrap();
        });
        assert_eq!(out, "(type) {\n},\n");
    }

    #[test]
    fn object_with_one_member() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.object_begin()
                .unwrap()
                .key("key")
                .unwrap()
                .primitive("primitive")
                .unwrap()
                .object_end()
                .unwrap();
        });
        assert_eq!(out, "{\n    key: primitive,\n},\n");
    }

    #[test]
    fn array_with_one_element() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.array_begin()
                .unwrap()
                .primitive("primitive")
                .unwrap()
                .array_end()
                .unwrap();
        });
        assert_eq!(out, "[\n    primitive,\n],\n");
    }

    #[test]
    fn nested_empty_object_in_object() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.object_begin()
                .unwrap()
                .key("key")
                .unwrap()
                .object_begin()
                .unwrap()
                .object_end()
                .unwrap()
                .object_end()
                .unwrap();
        });
        assert_eq!(out, "{\n    key: {\n    },\n},\n");
    }

    #[test]
    fn key_outside_object_is_rejected() {
        let mut writer = RawWriter::buffer(WriterOptions::default());
        assert_eq!(writer.key("k"), Err(UsageError::KeyOutsideObject));
    }

    #[test]
    fn double_key_is_rejected() {
        let mut writer = RawWriter::buffer(WriterOptions::default());
        writer.object_begin().unwrap();
        writer.key("a").unwrap();
        assert_eq!(writer.key("b"), Err(UsageError::KeyAlreadyPending));
    }

    #[test]
    fn object_end_with_pending_key_is_rejected() {
        let mut writer = RawWriter::buffer(WriterOptions::default());
        writer.object_begin().unwrap();
        writer.key("a").unwrap();
        assert_eq!(writer.object_end(), Err(UsageError::PendingAtObjectEnd));
    }

    #[test]
    fn unmatched_array_end_is_rejected() {
        let mut writer = RawWriter::buffer(WriterOptions::default());
        assert_eq!(writer.array_end(), Err(UsageError::NoMatchingArray));
    }

    #[test]
    fn double_type_is_rejected() {
        let mut writer = RawWriter::buffer(WriterOptions::default());
        writer.r#type("a").unwrap();
        assert_eq!(writer.r#type("b"), Err(UsageError::TypePending));
    }

    #[test]
    fn long_nested_document_matches_reader_fixture() {
        let out = dump(WriterOptions::pretty(), |w| {
            w.object_begin().unwrap();
            w.key("key1").unwrap().primitive("val1").unwrap();
            w.key("key1.5").unwrap().primitive("val1.5").unwrap();
            w.key("key2 with spaces")
                .unwrap()
                .primitive("val2 with spaces")
                .unwrap();
            w.key("key3")
                .unwrap()
                .r#type("type3")
                .unwrap()
                .primitive("val3")
                .unwrap();
            w.key("key4")
                .unwrap()
                .r#type("type4")
                .unwrap()
                .primitive("val4 with spaces")
                .unwrap();
            w.key("key5").unwrap().array_begin().unwrap();
            w.primitive("val5.1").unwrap();
            w.primitive("val5.2").unwrap();
            w.r#type("type5.3").unwrap().object_begin().unwrap();
            w.key("val5.3.3").unwrap().array_begin().unwrap();
            w.array_end().unwrap();
            w.object_end().unwrap();
            w.object_begin().unwrap().object_end().unwrap();
            w.array_end().unwrap();
            w.object_end().unwrap();
        });
        assert_eq!(
            out,
            "{\n    \
                key1: val1,\n    \
                key1.5: val1.5,\n    \
                \"key2 with spaces\": \"val2 with spaces\",\n    \
                key3: (type3) val3,\n    \
                key4: (type4) \"val4 with spaces\",\n    \
                key5: [\n        \
                    val5.1,\n        \
                    val5.2,\n        \
                    (type5.3) {\n            \
                        val5.3.3: [\n            \
                        ],\n        \
                    },\n        \
                    {\n        \
                    },\n    \
                ],\n\
            },\n"
        );
    }
}
