//! The flat event stream produced by [`crate::reader::RawReader`] and
//! consumed by [`crate::writer::RawWriter`].

use alloc::string::String;

/// One token of the luxem grammar, in the order it is read or should be
/// written.
///
/// A type tag always precedes the primitive or container-begin event it
/// applies to; a consumer that cares about tags must remember a pending
/// [`Event::Type`] across that one event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind", content = "value"))]
pub enum Event {
    /// `{` was read or should be written.
    ObjectBegin,
    /// `}` was read or should be written.
    ObjectEnd,
    /// `[` was read or should be written.
    ArrayBegin,
    /// `]` was read or should be written.
    ArrayEnd,
    /// An object member's key word, with escapes and quoting already
    /// resolved to its logical text.
    Key(String),
    /// A type tag's word, with escapes and quoting already resolved to
    /// its logical text.
    Type(String),
    /// A primitive word, with escapes and quoting already resolved to
    /// its logical text.
    Primitive(String),
}
