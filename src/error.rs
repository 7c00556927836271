//! Error types returned by the reader, writer, and ascii16 codec.

use core::fmt;

use thiserror::Error;

/// The category of a syntax error raised while parsing luxem text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A byte was encountered that cannot start or continue the current
    /// production (for example, a `(` where a value was not expected).
    UnexpectedByte,
    /// A quoted word was opened but never closed before the input ended.
    UnclosedString,
    /// An object or array was opened but never closed before the input
    /// ended.
    UnclosedContainer,
    /// A key word was read but was not followed by `:`.
    ExpectedColon,
    /// A `(` was immediately followed by `)` with no tag word between
    /// them.
    EmptyTag,
    /// The input ended mid-token with no more specific category applying
    /// (for example, inside an open type tag).
    IncompleteInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnexpectedByte => "unexpected byte",
            Self::UnclosedString => "unclosed quoted word",
            Self::UnclosedContainer => "unclosed object or array",
            Self::ExpectedColon => "expected ':'",
            Self::EmptyTag => "empty type tag",
            Self::IncompleteInput => "incomplete input",
        };
        f.write_str(text)
    }
}

/// A syntax error raised while parsing luxem text, carrying the byte
/// offset into the cumulative input stream at which it was detected.
///
/// Once a [`crate::reader::RawReader`] has produced a `ParseError` it is
/// poisoned: every subsequent pull returns a clone of the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    /// The category of syntax error.
    pub kind: ParseErrorKind,
    /// The byte offset into the cumulative input stream.
    pub offset: usize,
}

/// An illegal call into [`crate::writer::RawWriter`]'s event API, given
/// its current nesting and pending-tag/pending-key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    /// `key()` was called while not directly inside an object.
    #[error("key() called outside an open object")]
    KeyOutsideObject,
    /// `key()` was called twice in a row without an intervening value.
    #[error("key() called while a key is already pending a value")]
    KeyAlreadyPending,
    /// A value-shaped call (`primitive`/`object_begin`/`array_begin`)
    /// was made where no value is currently expected.
    #[error("a value was not expected at this position")]
    ValueNotExpected,
    /// `type()` was called twice in a row without an intervening value.
    #[error("type() called more than once before a value")]
    TypePending,
    /// `object_end()` was called with a key pending or a type tag
    /// pending.
    #[error("object_end() called with a pending key or type")]
    PendingAtObjectEnd,
    /// `array_end()` was called with a type tag pending.
    #[error("array_end() called with a pending type")]
    PendingAtArrayEnd,
    /// `object_end()` was called without a matching `object_begin()`.
    #[error("object_end() called without a matching object_begin()")]
    NoMatchingObject,
    /// `array_end()` was called without a matching `array_begin()`.
    #[error("array_end() called without a matching array_begin()")]
    NoMatchingArray,
}

/// An error from the `ascii16` binary codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The encoded text had an odd number of characters; ascii16 encodes
    /// two characters per byte.
    #[error("ascii16 input has odd length {len}")]
    OddLength {
        /// The length of the offending input, in bytes.
        len: usize,
    },
    /// A character outside the `a`..=`p` alphabet appeared in the
    /// encoded text.
    #[error("ascii16 input contains byte {byte:#x} at index {index} outside 'a'..='p'")]
    InvalidChar {
        /// The offending byte.
        byte: u8,
        /// Its index into the encoded text.
        index: usize,
    },
}

/// An error surfaced by the structured reader/writer collaborators
/// layered over the raw event stream.
#[cfg(feature = "structured")]
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The underlying raw reader reported a syntax error.
    #[error("parse error while reading a structured value: {0}")]
    Parse(#[from] ParseError),
    /// A tagged bytes primitive used a codec that could not decode it.
    #[error("codec error while reading a tagged primitive: {0}")]
    Codec(#[from] CodecError),
    /// `key()` was registered or dispatched outside of an object.
    #[error("key event received outside of an object")]
    KeyOutsideObject,
    /// A primitive was expected but a container was found instead, or
    /// vice versa.
    #[error("expected a primitive value")]
    ExpectedPrimitive,
    /// A typed bytes value used a tag other than `ascii16` or `base64`.
    #[error("expected a value tagged `ascii16` or `base64`")]
    ExpectedTaggedBytes,
    /// A typed value's tag did not match the name the caller asked for.
    #[error("expected type tag `{expected}` but found `{found}`")]
    UnexpectedTag {
        /// The tag the caller asked for.
        expected: &'static str,
        /// The tag actually present.
        found: alloc::string::String,
    },
    /// The event stream ended before a value the caller asked for could
    /// be fully read.
    #[error("unexpected end of event stream")]
    UnexpectedEnd,
    /// A container's `*_end` event did not match the container that was
    /// opened; this indicates a bug in the underlying reader, not in
    /// caller code.
    #[error("mismatched container events from the underlying reader")]
    Mismatched,
    /// A primitive tagged `int` or `float` was not a valid numeric
    /// literal.
    #[error("invalid numeric literal {text:?}")]
    InvalidNumber {
        /// The primitive text that failed to parse.
        text: alloc::string::String,
    },
    /// A `base64`-tagged primitive could not be decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}
