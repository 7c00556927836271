//! The streaming pull reader.
//!
//! [`RawReader`] is fed text with [`RawReader::feed`] and pulled from
//! with its [`Iterator`] implementation; each call to `next` advances
//! the state machine by as little as possible and returns the next
//! [`Event`] once one is complete, or `None` once the buffered input is
//! exhausted and more is needed. [`RawReader::finish`] converts it into
//! a [`ClosedRawReader`], whose `Iterator` impl instead treats an
//! exhausted buffer as the true end of input, raising
//! [`ParseErrorKind::IncompleteInput`] or
//! [`ParseErrorKind::UnclosedContainer`] if the document was left in a
//! non-terminal state.
//!
//! Nesting is tracked with an explicit stack rather than recursion, so
//! depth is bounded only by available memory.

use alloc::{string::String, vec::Vec};
use core::mem;

use crate::{
    buffer::Buffer,
    error::{ParseError, ParseErrorKind},
    event::Event,
};

#[cfg(feature = "std")]
mod stream;
#[cfg(feature = "std")]
pub use stream::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object { need_value: bool },
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordKind {
    Bare,
    Quoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordRole {
    Tag,
    Key,
    Primitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Document root, or just after a completed top-level value.
    Doc,
    /// Directly inside an array, ready for an element or `]`.
    ArrayElement,
    /// Directly inside an object, ready for a key word or `}`.
    ObjectKey,
    /// A key word was just read; only `:` may follow.
    ObjectColon,
    /// `:` was just read; a value is required.
    ObjectValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Idle,
    InWord { kind: WordKind, role: WordRole },
    InEscape { kind: WordKind, role: WordRole },
    /// A tag word finished; only whitespace/commas then `)` may follow.
    TagClose,
}

enum Step {
    Continue,
    NeedMore,
    Done,
    Emit(Event),
    Error(ParseErrorKind),
}

fn is_ascii_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_delim(c: char) -> bool {
    matches!(
        c,
        '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' | '"'
    ) || is_ascii_ws(c)
}

fn is_ws_or_comma(c: char) -> bool {
    c == ',' || is_ascii_ws(c)
}

/// A streaming pull reader over luxem text.
///
/// `RawReader` never blocks and never allocates more than the text it
/// has been fed and not yet consumed: [`feed`](RawReader::feed) appends
/// to an internal buffer, and pulling from the `Iterator` drains as much
/// of it as currently makes a complete event.
#[derive(Debug)]
pub struct RawReader {
    buf: Buffer,
    offset: usize,
    stack: Vec<Frame>,
    position: Position,
    scan: Scan,
    token: String,
    pending_tag: Option<String>,
    poison: Option<ParseError>,
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RawReader {
    /// Creates an empty reader positioned at the document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Buffer::new(),
            offset: 0,
            stack: Vec::new(),
            position: Position::Doc,
            scan: Scan::Idle,
            token: String::new(),
            pending_tag: None,
            poison: None,
        }
    }

    /// Appends `text` to the reader's internal buffer. Always reports
    /// the whole chunk consumed; parsing happens lazily as the
    /// `Iterator` is pulled.
    pub fn feed(&mut self, text: &str) -> usize {
        if self.poison.is_none() {
            self.buf.push(text);
        }
        text.len()
    }

    /// Closes the reader: no more text will be fed. The returned
    /// [`ClosedRawReader`] drains any remaining buffered text, erroring
    /// if it ends mid-token or inside an unclosed container.
    #[must_use]
    pub fn finish(self) -> ClosedRawReader {
        ClosedRawReader { inner: self }
    }

    fn consume(&mut self) -> char {
        let c = self.buf.consume().expect("caller already peeked a char");
        self.offset += c.len_utf8();
        c
    }

    fn after_value_position(&mut self) {
        self.position = match self.stack.last() {
            None => Position::Doc,
            Some(Frame::Array) => Position::ArrayElement,
            Some(Frame::Object { .. }) => Position::ObjectKey,
        };
    }

    fn open_container(&mut self, frame: Frame) {
        self.position = match frame {
            Frame::Object { .. } => Position::ObjectKey,
            Frame::Array => Position::ArrayElement,
        };
        self.stack.push(frame);
    }

    fn start_value_word(&mut self, c: char, role: WordRole) -> Step {
        if c == '"' {
            self.consume();
            self.token.clear();
            self.scan = Scan::InWord {
                kind: WordKind::Quoted,
                role,
            };
            Step::Continue
        } else if is_delim(c) {
            Step::Error(ParseErrorKind::UnexpectedByte)
        } else {
            self.token.clear();
            self.scan = Scan::InWord {
                kind: WordKind::Bare,
                role,
            };
            Step::Continue
        }
    }

    fn finish_word(&mut self, role: WordRole) -> Step {
        let text = mem::take(&mut self.token);
        match role {
            WordRole::Tag => {
                self.pending_tag = Some(text);
                self.scan = Scan::TagClose;
                Step::Continue
            }
            WordRole::Key => {
                self.scan = Scan::Idle;
                self.position = Position::ObjectColon;
                Step::Emit(Event::Key(text))
            }
            WordRole::Primitive => {
                self.scan = Scan::Idle;
                self.after_value_position();
                Step::Emit(Event::Primitive(text))
            }
        }
    }

    fn skip_ws_and_commas(&mut self) {
        while let Some(c) = self.buf.peek() {
            if is_ws_or_comma(c) {
                self.consume();
            } else {
                break;
            }
        }
    }

    fn step(&mut self, finishing: bool) -> Step {
        match self.scan {
            Scan::Idle => self.step_idle(finishing),
            Scan::InWord { kind, role } => self.step_in_word(kind, role, finishing),
            Scan::InEscape { kind, role } => self.step_in_escape(kind, role, finishing),
            Scan::TagClose => self.step_tag_close(finishing),
        }
    }

    fn step_idle(&mut self, finishing: bool) -> Step {
        self.skip_ws_and_commas();
        let Some(c) = self.buf.peek() else {
            return self.handle_eof_idle(finishing);
        };
        match self.position {
            Position::ObjectColon => {
                if c == ':' {
                    self.consume();
                    self.position = Position::ObjectValue;
                    Step::Continue
                } else {
                    Step::Error(ParseErrorKind::ExpectedColon)
                }
            }
            Position::ObjectKey => {
                if c == '}' {
                    self.consume();
                    self.close_container()
                } else {
                    self.start_value_word(c, WordRole::Key)
                }
            }
            Position::Doc | Position::ArrayElement | Position::ObjectValue => {
                if self.position == Position::ArrayElement && c == ']' {
                    self.consume();
                    self.close_container()
                } else {
                    match c {
                        '(' => {
                            self.consume();
                            self.start_tag()
                        }
                        '{' => {
                            self.consume();
                            self.open_container(Frame::Object { need_value: false });
                            Step::Emit(Event::ObjectBegin)
                        }
                        '[' => {
                            self.consume();
                            self.open_container(Frame::Array);
                            Step::Emit(Event::ArrayBegin)
                        }
                        _ if is_delim(c) => Step::Error(ParseErrorKind::UnexpectedByte),
                        _ => self.start_value_word(c, WordRole::Primitive),
                    }
                }
            }
        }
    }

    fn start_tag(&mut self) -> Step {
        self.skip_ws_and_commas();
        let Some(c) = self.buf.peek() else {
            return Step::Error(ParseErrorKind::IncompleteInput);
        };
        if c == ')' {
            Step::Error(ParseErrorKind::EmptyTag)
        } else {
            self.start_value_word(c, WordRole::Tag)
        }
    }

    fn step_tag_close(&mut self, finishing: bool) -> Step {
        self.skip_ws_and_commas();
        match self.buf.peek() {
            None => {
                if finishing {
                    Step::Error(ParseErrorKind::IncompleteInput)
                } else {
                    Step::NeedMore
                }
            }
            Some(')') => {
                self.consume();
                self.scan = Scan::Idle;
                let tag = self.pending_tag.take().expect("tag word just completed");
                Step::Emit(Event::Type(tag))
            }
            Some(_) => Step::Error(ParseErrorKind::UnexpectedByte),
        }
    }

    fn step_in_word(&mut self, kind: WordKind, role: WordRole, finishing: bool) -> Step {
        loop {
            let Some(c) = self.buf.peek() else {
                return match kind {
                    WordKind::Bare => {
                        if finishing {
                            self.finish_word(role)
                        } else {
                            Step::NeedMore
                        }
                    }
                    WordKind::Quoted => {
                        if finishing {
                            Step::Error(ParseErrorKind::UnclosedString)
                        } else {
                            Step::NeedMore
                        }
                    }
                };
            };
            if c == '\\' {
                self.consume();
                self.scan = Scan::InEscape { kind, role };
                return Step::Continue;
            }
            match kind {
                WordKind::Quoted if c == '"' => {
                    self.consume();
                    return self.finish_word(role);
                }
                WordKind::Bare if is_delim(c) => return self.finish_word(role),
                _ => {
                    self.consume();
                    self.token.push(c);
                }
            }
        }
    }

    fn step_in_escape(&mut self, kind: WordKind, role: WordRole, finishing: bool) -> Step {
        match self.buf.peek() {
            None => {
                if finishing {
                    let category = match kind {
                        WordKind::Quoted => ParseErrorKind::UnclosedString,
                        WordKind::Bare => ParseErrorKind::IncompleteInput,
                    };
                    Step::Error(category)
                } else {
                    Step::NeedMore
                }
            }
            Some(c) => {
                self.consume();
                self.token.push(c);
                self.scan = Scan::InWord { kind, role };
                Step::Continue
            }
        }
    }

    fn close_container(&mut self) -> Step {
        let popped = self.stack.pop();
        let event = match (self.position, popped) {
            (Position::ObjectKey, Some(Frame::Object { .. })) => Event::ObjectEnd,
            (Position::ArrayElement, Some(Frame::Array)) => Event::ArrayEnd,
            _ => return Step::Error(ParseErrorKind::UnexpectedByte),
        };
        self.after_value_position();
        Step::Emit(event)
    }

    fn handle_eof_idle(&mut self, finishing: bool) -> Step {
        if !finishing {
            return Step::NeedMore;
        }
        if self.stack.is_empty() && self.position == Position::Doc {
            Step::Done
        } else {
            Step::Error(ParseErrorKind::UnclosedContainer)
        }
    }

    fn run(&mut self, finishing: bool) -> Option<Result<Event, ParseError>> {
        if let Some(err) = &self.poison {
            return Some(Err(err.clone()));
        }
        loop {
            match self.step(finishing) {
                Step::Continue => {}
                Step::NeedMore | Step::Done => return None,
                Step::Emit(event) => return Some(Ok(event)),
                Step::Error(kind) => {
                    let err = ParseError {
                        kind,
                        offset: self.offset,
                    };
                    self.poison = Some(err.clone());
                    return Some(Err(err));
                }
            }
        }
    }
}

impl Iterator for RawReader {
    type Item = Result<Event, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.run(false)
    }
}

/// A [`RawReader`] that has been told no more input is coming.
///
/// Its `Iterator` implementation drains any remaining buffered text and
/// ends with `None` only once the document reached a clean terminal
/// state (no open containers, no partial token); otherwise it yields a
/// final [`ParseError`].
#[derive(Debug)]
pub struct ClosedRawReader {
    inner: RawReader,
}

impl Iterator for ClosedRawReader {
    type Item = Result<Event, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.run(true)
    }
}


#[cfg(test)]
mod proptests {
    use alloc::{string::ToString, vec::Vec};

    use quickcheck_macros::quickcheck;

    use super::*;

    /// Feeding the same text in one shot or split across arbitrarily
    /// many chunks must produce the same event sequence.
    #[quickcheck]
    fn chunk_invariance(splits: Vec<u8>) -> bool {
        let text = "{a:1,b:[2,3,(t) \"four five\"]}";
        let whole: Vec<_> = {
            let mut r = RawReader::new();
            r.feed(text);
            r.finish().collect::<Result<Vec<_>, _>>().unwrap()
        };

        let mut reader = RawReader::new();
        let mut pos = 0;
        for split in &splits {
            let take = (*split as usize % 3 + 1).min(text.len() - pos);
            reader.feed(&text[pos..pos + take]);
            pos += take;
            if pos >= text.len() {
                break;
            }
        }
        reader.feed(&text[pos..]);
        let chunked: Vec<_> = reader.finish().collect::<Result<Vec<_>, _>>().unwrap();
        whole == chunked
    }

    #[quickcheck]
    fn bare_word_escape_roundtrip(word: alloc::string::String) -> bool {
        if word.is_empty() || word.contains(['{', '}', '[', ']', '(', ')', ':', ',', '"', '\\']) {
            return true;
        }
        if word.chars().any(char::is_whitespace) {
            return true;
        }
        let mut reader = RawReader::new();
        reader.feed(&word);
        let got = reader.finish().collect::<Result<Vec<_>, _>>().unwrap();
        got == alloc::vec![Event::Primitive(word.to_string())]
    }
}
