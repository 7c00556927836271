//! Walks a host value and issues [`crate::writer::RawWriter`] events.
//!
//! Grounded in `write.py`'s `Writer._process`/`value`: a host type opts
//! in by implementing [`ToLuxem`], the Rust analogue of `write.py`'s
//! runtime `hasattr(item, 'iteritems')`/`isinstance(item, struct.Typed)`
//! dispatch, made static instead of duck-typed. Traversal uses an
//! explicit stack of work frames (`_ArrayElement`/`_ObjectElement` in
//! `write.py`) rather than recursion, so that writing a deeply nested
//! value cannot overflow the native call stack.

use alloc::{boxed::Box, format, string::String, vec, vec::Vec};

use crate::{error::UsageError, writer::{RawWriter, Sink}};

/// A host value's shape, as [`ToLuxem::to_luxem`] describes it to the
/// structured writer.
#[derive(Debug, Clone, PartialEq)]
pub enum LuxemShape {
    /// An already-formatted primitive word.
    Primitive(String),
    /// Raw binary content; written using the ascii16 codec unless
    /// wrapped in a [`LuxemShape::Tagged`] `"base64"` tag.
    Bytes(Vec<u8>),
    /// A signed integer, stringified when written.
    Int(i64),
    /// A floating-point number, stringified when written.
    Float(f64),
    /// A value annotated with a type tag.
    Tagged(String, Box<LuxemShape>),
    /// An ordered sequence of values.
    Array(Vec<LuxemShape>),
    /// An ordered mapping of keys to values.
    Object(Vec<(String, LuxemShape)>),
}

/// A host type that can be written as a luxem value.
///
/// [`crate::structured::Value`] implements this directly, so a tree
/// built by the structured reader can be re-emitted unchanged.
pub trait ToLuxem {
    /// Describes `self`'s shape for the structured writer to emit.
    fn to_luxem(&self) -> LuxemShape;
}

enum Frame {
    Array(vec::IntoIter<LuxemShape>),
    Object(vec::IntoIter<(String, LuxemShape)>),
}

enum Step {
    Value(LuxemShape),
    KeyValue(String, LuxemShape),
    EndArray,
    EndObject,
    Done,
}

fn next_step(stack: &mut Vec<Frame>) -> Step {
    match stack.last_mut() {
        None => Step::Done,
        Some(Frame::Array(iter)) => match iter.next() {
            Some(shape) => Step::Value(shape),
            None => Step::EndArray,
        },
        Some(Frame::Object(iter)) => match iter.next() {
            Some((key, shape)) => Step::KeyValue(key, shape),
            None => Step::EndObject,
        },
    }
}

fn process<S: Sink>(
    writer: &mut RawWriter<S>,
    shape: LuxemShape,
    stack: &mut Vec<Frame>,
) -> Result<(), UsageError> {
    match shape {
        LuxemShape::Object(items) => {
            writer.object_begin()?;
            stack.push(Frame::Object(items.into_iter()));
        }
        LuxemShape::Array(items) => {
            writer.array_begin()?;
            stack.push(Frame::Array(items.into_iter()));
        }
        LuxemShape::Tagged(tag, inner) => match (tag.as_str(), *inner) {
            ("ascii16", LuxemShape::Bytes(bytes)) => {
                writer.r#type(&tag)?;
                writer.primitive(&crate::ascii16::encode(&bytes))?;
            }
            ("base64", LuxemShape::Bytes(bytes)) => {
                use base64::Engine as _;
                let text = base64::engine::general_purpose::STANDARD.encode(&bytes);
                writer.r#type(&tag)?;
                writer.primitive(&text)?;
            }
            (_, inner) => {
                writer.r#type(&tag)?;
                process(writer, inner, stack)?;
            }
        },
        LuxemShape::Primitive(text) => {
            writer.primitive(&text)?;
        }
        LuxemShape::Bytes(bytes) => {
            writer.primitive(&crate::ascii16::encode(&bytes))?;
        }
        LuxemShape::Int(n) => {
            writer.primitive(&format!("{n}"))?;
        }
        LuxemShape::Float(f) => {
            writer.primitive(&format!("{f}"))?;
        }
    }
    Ok(())
}

/// Writes `value` to `writer`, expanding containers iteratively with an
/// explicit work stack rather than native recursion.
///
/// # Errors
///
/// Returns [`UsageError`] if `writer` is not positioned to accept a
/// value (for example, a `key()` is pending inside an enclosing
/// object).
pub fn write_value<S: Sink>(
    writer: &mut RawWriter<S>,
    value: &dyn ToLuxem,
) -> Result<(), UsageError> {
    let mut stack: Vec<Frame> = Vec::new();
    process(writer, value.to_luxem(), &mut stack)?;
    loop {
        match next_step(&mut stack) {
            Step::Done => return Ok(()),
            Step::Value(shape) => process(writer, shape, &mut stack)?,
            Step::KeyValue(key, shape) => {
                writer.key(&key)?;
                process(writer, shape, &mut stack)?;
            }
            Step::EndArray => {
                writer.array_end()?;
                stack.pop();
            }
            Step::EndObject => {
                writer.object_end()?;
                stack.pop();
            }
        }
    }
}
