//! Assembles a flat event stream into host-language data via
//! per-key/per-element handler tables.
//!
//! Grounded in `read.py`'s `Reader`/`Reader.Object`/`Reader.Array`: a
//! document is driven top-down, each object registers handlers by key
//! (plus an optional pass-through handler and a "finished" hook fired
//! on `object_end`), and each array registers one per-element handler.
//! Unlike `read.py`, handler registration and dispatch are statically
//! typed through [`StructuredCursor`] rather than duck-typed callbacks.

use alloc::{boxed::Box, string::String, vec::Vec};

use super::value::{build, next_or_end, Value};
use crate::{
    error::{HandlerError, ParseError},
    event::Event,
};

type KeyHandler<'h, R> = Box<dyn FnMut(&mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h>;
type PassthroughHandler<'h, R> =
    Box<dyn FnMut(&str, &mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h>;
type ElementHandler<'h, R> = Box<dyn FnMut(&mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h>;
type FinishedHandler<'h> = Box<dyn FnMut() + 'h>;

/// Checks a value's type tag, if present, against an expected name.
fn check_tag(tag: &Option<String>, expected: &'static str) -> Result<(), HandlerError> {
    match tag {
        Some(t) if t != expected => Err(HandlerError::UnexpectedTag {
            expected,
            found: t.clone(),
        }),
        _ => Ok(()),
    }
}

/// Ported verbatim from `read.py`'s `process_typed_bool`: the content
/// is compared case-insensitively against `{"0", "false", "no"}`; any
/// other content, including non-boolean garbage, decodes to `true`.
/// This is almost certainly a bug in the original, but it is preserved
/// here rather than silently corrected, since callers may depend on it.
#[must_use]
pub fn process_typed_bool(text: &str) -> bool {
    !(text.eq_ignore_ascii_case("0") || text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("no"))
}

/// A single pending value, positioned right after its `key`/element
/// slot and any [`Event::Type`] have already been consumed.
///
/// Exposes the typed accessors `read.py`'s `process_bool`/`process_int`/
/// `process_float`/`process_bytes` free functions provide, plus
/// [`StructuredCursor::expect_object`]/[`StructuredCursor::expect_array`]
/// for recursing into nested handler tables and
/// [`StructuredCursor::read_value`] for materializing a full
/// [`Value`] tree instead.
pub struct StructuredCursor<'a, R> {
    events: &'a mut R,
    tag: Option<String>,
    peeked: Option<Event>,
}

impl<'a, R: Iterator<Item = Result<Event, ParseError>>> StructuredCursor<'a, R> {
    /// The type tag that preceded this value, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn next_raw(&mut self) -> Result<Event, HandlerError> {
        if let Some(event) = self.peeked.take() {
            return Ok(event);
        }
        next_or_end(self.events)
    }

    /// Reads this value as a primitive word.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::ExpectedPrimitive`] if a container was
    /// found instead.
    pub fn read_primitive(&mut self) -> Result<String, HandlerError> {
        match self.next_raw()? {
            Event::Primitive(text) => Ok(text),
            _ => Err(HandlerError::ExpectedPrimitive),
        }
    }

    /// Reads this value as a `bool`, tolerating the original's
    /// permissive vocabulary (see [`process_typed_bool`]).
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnexpectedTag`] if a type tag other than
    /// `"bool"` precedes this value, or [`HandlerError::ExpectedPrimitive`]
    /// if a container was found.
    pub fn read_bool(&mut self) -> Result<bool, HandlerError> {
        check_tag(&self.tag, "bool")?;
        Ok(process_typed_bool(&self.read_primitive()?))
    }

    /// Reads this value as an `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnexpectedTag`], [`HandlerError::ExpectedPrimitive`],
    /// or [`HandlerError::InvalidNumber`] if the text does not parse.
    pub fn read_int(&mut self) -> Result<i64, HandlerError> {
        check_tag(&self.tag, "int")?;
        let text = self.read_primitive()?;
        text.parse().map_err(|_| HandlerError::InvalidNumber { text })
    }

    /// Reads this value as an `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnexpectedTag`], [`HandlerError::ExpectedPrimitive`],
    /// or [`HandlerError::InvalidNumber`] if the text does not parse.
    pub fn read_float(&mut self) -> Result<f64, HandlerError> {
        check_tag(&self.tag, "float")?;
        let text = self.read_primitive()?;
        text.parse().map_err(|_| HandlerError::InvalidNumber { text })
    }

    /// Reads this value as a `string`-tagged primitive.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnexpectedTag`] or [`HandlerError::ExpectedPrimitive`].
    pub fn read_string(&mut self) -> Result<String, HandlerError> {
        check_tag(&self.tag, "string")?;
        self.read_primitive()
    }

    /// Reads this value as binary bytes, per `read.py`'s `process_bytes`:
    /// the tag must be present and must be `"ascii16"` or `"base64"`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::ExpectedTaggedBytes`] if no tag, or a
    /// tag other than `ascii16`/`base64`, is present; returns
    /// [`HandlerError::Codec`]/[`HandlerError::Base64`] if decoding
    /// fails.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, HandlerError> {
        match self.tag.as_deref() {
            Some("ascii16") => {
                let text = self.read_primitive()?;
                Ok(crate::ascii16::decode(&text)?)
            }
            Some("base64") => {
                use base64::Engine as _;
                let text = self.read_primitive()?;
                Ok(base64::engine::general_purpose::STANDARD.decode(text.as_bytes())?)
            }
            _ => Err(HandlerError::ExpectedTaggedBytes),
        }
    }

    /// Reads this value as a full [`Value`] tree, preserving its type
    /// tag and recursing into any nested containers.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Mismatched`] if the event stream is
    /// malformed, or [`HandlerError::UnexpectedEnd`] if it ends early.
    pub fn read_value(&mut self) -> Result<Value, HandlerError> {
        let first = self.next_raw()?;
        build(first, self.tag.take(), self.events)
    }

    /// Expects this value to be an object and drives `table` against
    /// its members until the matching `object_end`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Mismatched`] if this value is not an
    /// object, plus anything a registered handler returns.
    pub fn expect_object(&mut self, table: &mut ObjectReader<'_, R>) -> Result<(), HandlerError> {
        match self.next_raw()? {
            Event::ObjectBegin => drive_object(self.events, table),
            _ => Err(HandlerError::Mismatched),
        }
    }

    /// Expects this value to be an array and drives `table` against
    /// its elements until the matching `array_end`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Mismatched`] if this value is not an
    /// array, plus anything a registered handler returns.
    pub fn expect_array(&mut self, table: &mut ArrayReader<'_, R>) -> Result<(), HandlerError> {
        match self.next_raw()? {
            Event::ArrayBegin => drive_array(self.events, table),
            _ => Err(HandlerError::Mismatched),
        }
    }
}

/// A handler table for an object's members, keyed by name.
///
/// Built from [`ObjectReader::new`] and populated with [`ObjectReader::key`]
/// (or one of its typed convenience wrappers) before being driven by
/// [`StructuredCursor::expect_object`] or [`StructuredReader::run`].
/// Duplicate keys in the input each dispatch independently — the table
/// does not merge or reject them, matching the data model's "parser
/// reports each occurrence" invariant.
pub struct ObjectReader<'h, R> {
    handlers: Vec<(String, KeyHandler<'h, R>)>,
    passthrough: Option<PassthroughHandler<'h, R>>,
    finished: Option<FinishedHandler<'h>>,
}

impl<'h, R: Iterator<Item = Result<Event, ParseError>>> Default for ObjectReader<'h, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, R: Iterator<Item = Result<Event, ParseError>>> ObjectReader<'h, R> {
    /// Creates an empty handler table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            passthrough: None,
            finished: None,
        }
    }

    /// Registers a handler for member `name`. The last registration for
    /// a given name wins if called more than once.
    pub fn key(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h,
    ) -> &mut Self {
        self.handlers.push((name.into(), Box::new(handler)));
        self
    }

    /// Registers a `bool`-typed handler for member `name`.
    pub fn key_bool(&mut self, name: impl Into<String>, mut callback: impl FnMut(bool) + 'h) -> &mut Self {
        self.key(name, move |c| {
            callback(c.read_bool()?);
            Ok(())
        })
    }

    /// Registers an `i64`-typed handler for member `name`.
    pub fn key_int(&mut self, name: impl Into<String>, mut callback: impl FnMut(i64) + 'h) -> &mut Self {
        self.key(name, move |c| {
            callback(c.read_int()?);
            Ok(())
        })
    }

    /// Registers an `f64`-typed handler for member `name`.
    pub fn key_float(&mut self, name: impl Into<String>, mut callback: impl FnMut(f64) + 'h) -> &mut Self {
        self.key(name, move |c| {
            callback(c.read_float()?);
            Ok(())
        })
    }

    /// Registers a `string`-typed handler for member `name`.
    pub fn key_string(
        &mut self,
        name: impl Into<String>,
        mut callback: impl FnMut(String) + 'h,
    ) -> &mut Self {
        self.key(name, move |c| {
            callback(c.read_string()?);
            Ok(())
        })
    }

    /// Registers a binary-bytes handler (`ascii16`/`base64`-tagged) for
    /// member `name`.
    pub fn key_bytes(
        &mut self,
        name: impl Into<String>,
        mut callback: impl FnMut(Vec<u8>) + 'h,
    ) -> &mut Self {
        self.key(name, move |c| {
            callback(c.read_bytes()?);
            Ok(())
        })
    }

    /// Registers a handler for member `name` that receives the member's
    /// full members list, after checking the value is itself an object.
    pub fn key_object(
        &mut self,
        name: impl Into<String>,
        mut callback: impl FnMut(Vec<(String, Value)>) + 'h,
    ) -> &mut Self {
        self.key(name, move |c| match c.read_value()? {
            Value::Object(_, items) => {
                callback(items);
                Ok(())
            }
            _ => Err(HandlerError::ExpectedPrimitive),
        })
    }

    /// Registers a handler for member `name` that receives the member's
    /// elements, after checking the value is itself an array.
    pub fn key_array(
        &mut self,
        name: impl Into<String>,
        mut callback: impl FnMut(Vec<Value>) + 'h,
    ) -> &mut Self {
        self.key(name, move |c| match c.read_value()? {
            Value::Array(_, items) => {
                callback(items);
                Ok(())
            }
            _ => Err(HandlerError::ExpectedPrimitive),
        })
    }

    /// Registers a handler for member `name` that receives the member's
    /// value as a full [`Value`] tree, of any shape.
    pub fn key_any(&mut self, name: impl Into<String>, mut callback: impl FnMut(Value) + 'h) -> &mut Self {
        self.key(name, move |c| {
            callback(c.read_value()?);
            Ok(())
        })
    }

    /// Registers a catch-all handler invoked for any member not matched
    /// by a `key*` registration, receiving the member's name.
    pub fn passthrough(
        &mut self,
        handler: impl FnMut(&str, &mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h,
    ) -> &mut Self {
        self.passthrough = Some(Box::new(handler));
        self
    }

    /// Registers a hook invoked once, when the object's `object_end` is
    /// reached.
    pub fn finished(&mut self, handler: impl FnMut() + 'h) -> &mut Self {
        self.finished = Some(Box::new(handler));
        self
    }
}

/// A handler table for an array's elements.
///
/// Unlike [`ObjectReader`], there is exactly one element handler for
/// the whole array (arrays have no per-index registration), matching
/// `read.py`'s `Reader.Array.element`.
pub struct ArrayReader<'h, R> {
    element: Option<ElementHandler<'h, R>>,
    finished: Option<FinishedHandler<'h>>,
}

impl<'h, R: Iterator<Item = Result<Event, ParseError>>> Default for ArrayReader<'h, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, R: Iterator<Item = Result<Event, ParseError>>> ArrayReader<'h, R> {
    /// Creates a handler table with no element handler registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            element: None,
            finished: None,
        }
    }

    /// Registers the handler invoked for every element. A later call
    /// replaces an earlier one.
    pub fn element(
        &mut self,
        handler: impl FnMut(&mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h,
    ) -> &mut Self {
        self.element = Some(Box::new(handler));
        self
    }

    /// Registers a hook invoked once, when the array's `array_end` is
    /// reached.
    pub fn finished(&mut self, handler: impl FnMut() + 'h) -> &mut Self {
        self.finished = Some(Box::new(handler));
        self
    }
}

fn drive_object<R: Iterator<Item = Result<Event, ParseError>>>(
    events: &mut R,
    table: &mut ObjectReader<'_, R>,
) -> Result<(), HandlerError> {
    loop {
        match next_or_end(events)? {
            Event::ObjectEnd => {
                if let Some(finished) = table.finished.as_mut() {
                    finished();
                }
                return Ok(());
            }
            Event::Key(name) => {
                let mut event = next_or_end(events)?;
                let mut tag = None;
                if let Event::Type(t) = event {
                    tag = Some(t);
                    event = next_or_end(events)?;
                }
                let mut cursor = StructuredCursor {
                    events: &mut *events,
                    tag,
                    peeked: Some(event),
                };
                let handler = table.handlers.iter_mut().find(|(key, _)| *key == name);
                match handler {
                    Some((_, handler)) => handler(&mut cursor)?,
                    None => match table.passthrough.as_mut() {
                        Some(passthrough) => passthrough(&name, &mut cursor)?,
                        None => {
                            cursor.read_value()?;
                        }
                    },
                }
            }
            _ => return Err(HandlerError::Mismatched),
        }
    }
}

fn drive_array<R: Iterator<Item = Result<Event, ParseError>>>(
    events: &mut R,
    table: &mut ArrayReader<'_, R>,
) -> Result<(), HandlerError> {
    loop {
        let event = next_or_end(events)?;
        let (tag, value_event) = match event {
            Event::ArrayEnd => {
                if let Some(finished) = table.finished.as_mut() {
                    finished();
                }
                return Ok(());
            }
            Event::Type(t) => (Some(t), next_or_end(events)?),
            other => (None, other),
        };
        let mut cursor = StructuredCursor {
            events: &mut *events,
            tag,
            peeked: Some(value_event),
        };
        match table.element.as_mut() {
            Some(handler) => handler(&mut cursor)?,
            None => {
                cursor.read_value()?;
            }
        }
    }
}

/// Drives a whole document against a root element handler, treating
/// the top-level `Value*` sequence as an implicit array with no
/// delimiting `[`/`]` — the same model `read.py`'s `Reader.__init__`
/// uses (`self._stack = [Reader.Array()]`).
pub struct StructuredReader<'h, R> {
    events: R,
    root: ArrayReader<'h, R>,
}

impl<'h, R: Iterator<Item = Result<Event, ParseError>>> StructuredReader<'h, R> {
    /// Wraps `events` (typically a [`crate::reader::RawReader`] or
    /// [`crate::reader::ClosedRawReader`]) for structured reading.
    pub fn new(events: R) -> Self {
        Self {
            events,
            root: ArrayReader::new(),
        }
    }

    /// Registers the handler invoked for every top-level value.
    pub fn element(
        &mut self,
        handler: impl FnMut(&mut StructuredCursor<'_, R>) -> Result<(), HandlerError> + 'h,
    ) -> &mut Self {
        self.root.element(handler);
        self
    }

    /// Registers a hook invoked once the event stream is exhausted.
    pub fn finished(&mut self, handler: impl FnMut() + 'h) -> &mut Self {
        self.root.finished(handler);
        self
    }

    /// Drives the document to completion, dispatching each top-level
    /// value to the registered element handler.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Parse`] if the underlying reader reports
    /// a syntax error, or anything a registered handler returns.
    pub fn run(mut self) -> Result<(), HandlerError> {
        loop {
            let Some(event) = self.events.next() else {
                if let Some(finished) = self.root.finished.as_mut() {
                    finished();
                }
                return Ok(());
            };
            let event = event?;
            let (tag, value_event) = match event {
                Event::Type(t) => (Some(t), next_or_end(&mut self.events)?),
                other => (None, other),
            };
            let mut cursor = StructuredCursor {
                events: &mut self.events,
                tag,
                peeked: Some(value_event),
            };
            match self.root.element.as_mut() {
                Some(handler) => handler(&mut cursor)?,
                None => {
                    cursor.read_value()?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec, vec::Vec};

    use super::*;
    use crate::reader::RawReader;

    fn events(text: &str) -> crate::reader::ClosedRawReader {
        let mut reader = RawReader::new();
        reader.feed(text);
        reader.finish()
    }

    #[test]
    fn reads_typed_scalars_by_key() {
        let mut reader = RawReader::new();
        reader.feed("{a:(int) 7,b:(bool) no,c:(float) 1.5}");
        let mut closed = reader.finish();

        let mut ints = Vec::new();
        let mut bools = Vec::new();
        let mut floats = Vec::new();
        let mut table: ObjectReader<'_, crate::reader::ClosedRawReader> = ObjectReader::new();
        table.key_int("a", |n| ints.push(n));
        table.key_bool("b", |b| bools.push(b));
        table.key_float("c", |f| floats.push(f));

        let first = closed.next().unwrap().unwrap();
        assert_eq!(first, Event::ObjectBegin);
        let mut cursor = StructuredCursor {
            events: &mut closed,
            tag: None,
            peeked: None,
        };
        drive_object(cursor.events, &mut table).unwrap();

        assert_eq!(ints, vec![7]);
        assert_eq!(bools, vec![false]);
        assert_eq!(floats, vec![1.5]);
    }

    #[test]
    fn boolean_vocabulary_treats_garbage_as_true() {
        assert!(process_typed_bool("banana"));
        assert!(!process_typed_bool("NO"));
        assert!(!process_typed_bool("0"));
    }

    #[test]
    fn passthrough_receives_unregistered_keys() {
        let mut closed = events("{a:1,b:2}");
        closed.next().unwrap().unwrap(); // ObjectBegin

        let mut seen: Vec<(String, String)> = Vec::new();
        let mut table: ObjectReader<'_, crate::reader::ClosedRawReader> = ObjectReader::new();
        table.passthrough(|key, cursor| {
            let value = cursor.read_primitive()?;
            seen.push((key.to_string(), value));
            Ok(())
        });
        drive_object(&mut closed, &mut table).unwrap();
        assert_eq!(
            seen,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn structured_reader_runs_over_every_top_level_value() {
        let reader = {
            let mut r = RawReader::new();
            r.feed("1 2 3");
            r.finish()
        };
        let mut seen = Vec::new();
        let mut structured = StructuredReader::new(reader);
        structured.element(|c| {
            seen.push(c.read_primitive()?);
            Ok(())
        });
        structured.run().unwrap();
        assert_eq!(seen, vec!["1".to_string(), "2".to_string(), "3".to_string()]);
    }

    #[test]
    fn expect_array_drives_nested_elements() {
        let mut closed = events("[1,2,3]");
        let mut seen = Vec::new();
        let mut table: ArrayReader<'_, crate::reader::ClosedRawReader> = ArrayReader::new();
        table.element(|c| {
            seen.push(c.read_primitive()?);
            Ok(())
        });
        let first = closed.next().unwrap().unwrap();
        let mut cursor = StructuredCursor {
            events: &mut closed,
            tag: None,
            peeked: Some(first),
        };
        cursor.expect_array(&mut table).unwrap();
        assert_eq!(seen, vec!["1".to_string(), "2".to_string(), "3".to_string()]);
    }

    #[test]
    fn read_bytes_rejects_missing_tag() {
        let mut closed = events("beef");
        let first = closed.next().unwrap().unwrap();
        let mut cursor = StructuredCursor {
            events: &mut closed,
            tag: None,
            peeked: Some(first),
        };
        assert!(matches!(
            cursor.read_bytes(),
            Err(HandlerError::ExpectedTaggedBytes)
        ));
    }

    #[test]
    fn key_bytes_decodes_an_ascii16_tagged_member() {
        let mut reader = RawReader::new();
        reader.feed("{blob:(ascii16) abop}");
        let mut closed = reader.finish();
        closed.next().unwrap().unwrap(); // ObjectBegin

        let mut seen = Vec::new();
        let mut table: ObjectReader<'_, crate::reader::ClosedRawReader> = ObjectReader::new();
        table.key_bytes("blob", |bytes| seen.push(bytes));
        drive_object(&mut closed, &mut table).unwrap();

        assert_eq!(seen, vec![vec![0x01, 0xef]]);
    }

    #[test]
    fn key_array_and_key_object_hand_back_value_trees() {
        let mut reader = RawReader::new();
        reader.feed("{nums:[1,2],meta:{a:1}}");
        let mut closed = reader.finish();
        closed.next().unwrap().unwrap(); // ObjectBegin

        let mut nums = Vec::new();
        let mut meta = Vec::new();
        let mut table: ObjectReader<'_, crate::reader::ClosedRawReader> = ObjectReader::new();
        table.key_array("nums", |items| nums = items);
        table.key_object("meta", |items| meta = items);
        drive_object(&mut closed, &mut table).unwrap();

        assert_eq!(
            nums,
            vec![
                Value::Primitive(None, "1".to_string()),
                Value::Primitive(None, "2".to_string()),
            ]
        );
        assert_eq!(
            meta,
            vec![("a".to_string(), Value::Primitive(None, "1".to_string()))]
        );
    }
}
