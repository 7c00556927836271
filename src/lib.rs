//! A streaming, incremental reader and writer for the luxem data
//! format: a minimal, human-editable serialization format built from
//! type-tagged words, objects, and arrays.
//!
//! The core of this crate is a pair of pull-based primitives that never
//! buffer more of the document than necessary:
//!
//! - [`reader::RawReader`] incrementally parses fed text into a flat
//!   stream of [`event::Event`]s.
//! - [`writer::RawWriter`] does the inverse, accepting a flat stream of
//!   calls and incrementally emitting text to a [`writer::Sink`].
//!
//! The `structured` feature (on by default) layers a handler-table
//! reader and a trait-based writer on top of these primitives, for
//! callers who would rather describe "what a key means" than drive
//! the event stream by hand. See [`structured`] for details.
//!
//! [`ascii16`] is the binary-to-text codec luxem uses for tagged byte
//! strings that don't opt into `base64`.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod ascii16;
mod buffer;
mod error;
pub mod event;
pub mod reader;
#[cfg(feature = "structured")]
pub mod structured;
pub mod writer;

pub use error::{CodecError, ParseError, ParseErrorKind, UsageError};
#[cfg(feature = "structured")]
pub use error::HandlerError;
pub use event::Event;
pub use reader::{ClosedRawReader, RawReader};
#[cfg(feature = "structured")]
pub use structured::{
    ArrayReader, LuxemShape, ObjectReader, StructuredCursor, StructuredReader, ToLuxem, Value,
    write_value,
};
pub use writer::{BufferSink, CallbackSink, RawWriter, Sink, WriterOptions};
#[cfg(feature = "std")]
pub use writer::{IoSink, WriterIoError};
