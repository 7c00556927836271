//! The "struct convenience" tree type: a host-language assembly of an
//! entire luxem value, built by [`crate::structured::reader`] and
//! re-emittable by [`crate::structured::writer`].

use alloc::{
    boxed::Box,
    string::String,
    vec::Vec,
};

use super::writer::{LuxemShape, ToLuxem};
use crate::{
    error::{HandlerError, ParseError},
    event::Event,
};

/// A fully materialized luxem value: a tagged primitive, an ordered
/// sequence, or an ordered mapping.
///
/// Mirrors `read.py`'s `struct.Typed` wrapper, generalized to every
/// shape rather than only primitives: any variant may carry an optional
/// type tag, matching the data model's "any value may optionally carry
/// exactly one type tag."
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Value {
    /// An atomic value: its optional type tag and its literal text.
    Primitive(Option<String>, String),
    /// An ordered sequence, with an optional type tag.
    Array(Option<String>, Vec<Value>),
    /// An ordered mapping, with an optional type tag. Stored as a
    /// `Vec` of pairs, not a map, so key order and duplicate keys are
    /// preserved exactly as read (per the data model's ordering and
    /// duplicate-key invariants).
    Object(Option<String>, Vec<(String, Value)>),
}

impl Value {
    /// Reads exactly one top-level value (primitive, array, or object)
    /// from `events`, consuming its structural events but leaving
    /// anything after it untouched.
    ///
    /// `events` should be a [`crate::reader::ClosedRawReader`] (or
    /// anything else whose `next` returning `None` genuinely means "no
    /// more input is coming"). Fed against a still-open
    /// [`crate::reader::RawReader`], a `None` only means "more text is
    /// needed before this value can finish," which this method cannot
    /// distinguish from a truncated document and so reports as
    /// [`HandlerError::UnexpectedEnd`].
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Parse`] if the reader reports a syntax
    /// error, or [`HandlerError::UnexpectedEnd`]/[`HandlerError::Mismatched`]
    /// if the event stream ends or is malformed before one full value
    /// has been read.
    pub fn from_events<R>(events: &mut R) -> Result<Self, HandlerError>
    where
        R: Iterator<Item = Result<Event, ParseError>>,
    {
        let mut first = next_or_end(events)?;
        let mut tag = None;
        if let Event::Type(t) = first {
            tag = Some(t);
            first = next_or_end(events)?;
        }
        build(first, tag, events)
    }
}

pub(super) fn next_or_end<R>(events: &mut R) -> Result<Event, HandlerError>
where
    R: Iterator<Item = Result<Event, ParseError>>,
{
    events.next().ok_or(HandlerError::UnexpectedEnd)?.map_err(HandlerError::from)
}

/// Builds a [`Value`] whose opening event (`first`) and type tag have
/// already been read off `events`.
///
/// Recurses through the Rust call stack one level per nesting level,
/// same as `read.py`'s `_read_struct_element_*` callbacks it is
/// grounded on; unlike [`crate::reader::RawReader`] itself, this
/// collaborator layer is not required to bound its native stack use.
pub(super) fn build<R>(
    first: Event,
    tag: Option<String>,
    events: &mut R,
) -> Result<Value, HandlerError>
where
    R: Iterator<Item = Result<Event, ParseError>>,
{
    match first {
        Event::Primitive(text) => Ok(Value::Primitive(tag, text)),
        Event::ObjectBegin => {
            let mut items = Vec::new();
            loop {
                match next_or_end(events)? {
                    Event::ObjectEnd => break,
                    Event::Key(name) => {
                        let mut event = next_or_end(events)?;
                        let mut child_tag = None;
                        if let Event::Type(t) = event {
                            child_tag = Some(t);
                            event = next_or_end(events)?;
                        }
                        let value = build(event, child_tag, events)?;
                        items.push((name, value));
                    }
                    _ => return Err(HandlerError::Mismatched),
                }
            }
            Ok(Value::Object(tag, items))
        }
        Event::ArrayBegin => {
            let mut items = Vec::new();
            loop {
                match next_or_end(events)? {
                    Event::ArrayEnd => break,
                    Event::Type(t) => {
                        let event = next_or_end(events)?;
                        items.push(build(event, Some(t), events)?);
                    }
                    event => items.push(build(event, None, events)?),
                }
            }
            Ok(Value::Array(tag, items))
        }
        _ => Err(HandlerError::Mismatched),
    }
}

impl ToLuxem for Value {
    fn to_luxem(&self) -> LuxemShape {
        match self {
            Value::Primitive(tag, text) => tagged(tag, LuxemShape::Primitive(text.clone())),
            Value::Array(tag, items) => {
                let shape = LuxemShape::Array(items.iter().map(ToLuxem::to_luxem).collect());
                tagged(tag, shape)
            }
            Value::Object(tag, items) => {
                let shape = LuxemShape::Object(
                    items.iter().map(|(k, v)| (k.clone(), v.to_luxem())).collect(),
                );
                tagged(tag, shape)
            }
        }
    }
}

fn tagged(tag: &Option<String>, shape: LuxemShape) -> LuxemShape {
    match tag {
        Some(t) => LuxemShape::Tagged(t.clone(), Box::new(shape)),
        None => shape,
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;
    use crate::reader::RawReader;

    fn read(text: &str) -> Value {
        let mut reader = RawReader::new();
        reader.feed(text);
        let mut closed = reader.finish();
        Value::from_events(&mut closed).unwrap()
    }

    #[test]
    fn reads_a_bare_primitive() {
        assert_eq!(read("7"), Value::Primitive(None, "7".to_string()));
    }

    #[test]
    fn reads_a_tagged_primitive() {
        assert_eq!(
            read("(int) 7"),
            Value::Primitive(Some("int".to_string()), "7".to_string())
        );
    }

    #[test]
    fn reads_a_nested_object() {
        assert_eq!(
            read("{a:1,b:[2,3]}"),
            Value::Object(
                None,
                vec![
                    ("a".to_string(), Value::Primitive(None, "1".to_string())),
                    (
                        "b".to_string(),
                        Value::Array(
                            None,
                            vec![
                                Value::Primitive(None, "2".to_string()),
                                Value::Primitive(None, "3".to_string()),
                            ]
                        )
                    ),
                ]
            )
        );
    }

    #[test]
    fn reads_a_tagged_array() {
        assert_eq!(
            read("(vec) [1,2]"),
            Value::Array(
                Some("vec".to_string()),
                vec![
                    Value::Primitive(None, "1".to_string()),
                    Value::Primitive(None, "2".to_string()),
                ]
            )
        );
    }

    #[test]
    fn serde_round_trips_a_nested_value() {
        let value = Value::Object(
            None,
            vec![(
                "a".to_string(),
                Value::Primitive(Some("int".to_string()), "1".to_string()),
            )],
        );
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
