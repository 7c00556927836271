//! The structured reader/writer collaborators layered over the raw
//! event stream.
//!
//! These types define the event stream's primary consumer contract:
//! a handler-table-driven reader and a trait-based writer, both built
//! entirely on top of [`crate::reader::RawReader`] and
//! [`crate::writer::RawWriter`]. Neither adds anything to the wire
//! grammar.

pub mod reader;
pub mod writer;
mod value;

pub use reader::{ArrayReader, ObjectReader, StructuredCursor, StructuredReader};
pub use value::Value;
pub use writer::{LuxemShape, ToLuxem, write_value};
