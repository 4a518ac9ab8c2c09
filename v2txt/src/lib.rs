//! A tokenizer and token generator for Victoria 2 script files.
//!
//! Script files are loosely based on braces `{}` and `key = value`
//! assignments, typically encoded in `WINDOWS_1252`. Instead of building a
//! tree, [`TokenGenerator`] hands out one entry at a time so that loaders can
//! commit each declaration before reading the next one, skip malformed
//! blocks with [`TokenGenerator::discard_group`], or stash a block for a
//! later pass with [`TokenGenerator::capture_group`].

pub mod error;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::rc::Rc;

use encoding_rs::WINDOWS_1252;
use encoding_rs_io::DecodeReaderBytesBuilder;

pub use error::ParseError;

/// Represents a token scanned from a script file.
#[derive(Debug, Clone, PartialEq)]
pub enum V2TxtToken {
    /// An unquoted word (keys, values, dates such as `1836.1.1`).
    Identifier(String),
    /// A quoted string value.
    StringValue(String),
    /// A floating point number.
    FloatValue(f32),
    /// An integer number.
    IntValue(i32),
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `=`
    Equals,
}

/// A token together with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct LineToken {
    pub token: V2TxtToken,
    pub line: u32,
}

pub trait V2Txt {
    /// Reads and tokenizes a `WINDOWS_1252` encoded file.
    fn open_txt(path: &Path) -> std::io::Result<Vec<LineToken>> {
        let file = File::open(path)?;
        let mut buf_reader = BufReader::new(
            DecodeReaderBytesBuilder::new()
                .encoding(Some(WINDOWS_1252))
                .build(file),
        );
        let mut contents = String::new();
        buf_reader.read_to_string(&mut contents)?;
        Ok(Self::tokenize(&contents))
    }

    fn tokenize(contents: &str) -> Vec<LineToken> {
        let mut tokens: Vec<LineToken> = Vec::new();
        let mut chars = contents.chars().peekable();
        let mut line = 1u32;

        while let Some(&c) = chars.peek() {
            match c {
                '\n' => {
                    line += 1;
                    chars.next();
                }
                c if c.is_whitespace() => {
                    chars.next();
                }
                '#' => {
                    // comments run to the end of the line
                    while let Some(&nc) = chars.peek() {
                        if nc == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                '{' => {
                    tokens.push(LineToken {
                        token: V2TxtToken::LeftBrace,
                        line,
                    });
                    chars.next();
                }
                '}' => {
                    tokens.push(LineToken {
                        token: V2TxtToken::RightBrace,
                        line,
                    });
                    chars.next();
                }
                '=' => {
                    tokens.push(LineToken {
                        token: V2TxtToken::Equals,
                        line,
                    });
                    chars.next();
                }
                '"' => {
                    let start_line = line;
                    chars.next(); // consume "
                    let mut s = String::new();
                    for nc in chars.by_ref() {
                        if nc == '"' {
                            break;
                        }
                        if nc == '\n' {
                            line += 1;
                        }
                        s.push(nc);
                    }
                    tokens.push(LineToken {
                        token: V2TxtToken::StringValue(s),
                        line: start_line,
                    });
                }
                _ => {
                    let mut s = String::new();
                    while let Some(&nc) = chars.peek() {
                        if nc.is_whitespace()
                            || nc == '='
                            || nc == '{'
                            || nc == '}'
                            || nc == '#'
                            || nc == '"'
                        {
                            break;
                        }
                        s.push(nc);
                        chars.next();
                    }
                    tokens.push(LineToken {
                        token: classify_word(s),
                        line,
                    });
                }
            }
        }
        tokens
    }
}

/// Decides whether an unquoted word is a number or an identifier.
///
/// Rust's float parser accepts `nan`, `inf` and `infinity` in any case, which
/// collides with tags and names such as `NAN` or `Inf`; non-finite parses stay
/// identifiers.
fn classify_word(s: String) -> V2TxtToken {
    if let Ok(i) = s.parse::<i32>() {
        V2TxtToken::IntValue(i)
    } else if let Ok(f) = s.parse::<f32>()
        && f.is_finite()
    {
        V2TxtToken::FloatValue(f)
    } else {
        V2TxtToken::Identifier(s)
    }
}

pub struct DefaultV2Txt {}
impl V2Txt for DefaultV2Txt {}

/// A scalar on the right-hand side of an assignment, or a loose list value.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Identifier(String),
    Str(String),
    Int(i32),
    Float(f32),
}

impl TokenValue {
    fn from_token(token: &V2TxtToken) -> Option<TokenValue> {
        match token {
            V2TxtToken::Identifier(s) => Some(TokenValue::Identifier(s.clone())),
            V2TxtToken::StringValue(s) => Some(TokenValue::Str(s.clone())),
            V2TxtToken::IntValue(i) => Some(TokenValue::Int(*i)),
            V2TxtToken::FloatValue(f) => Some(TokenValue::Float(*f)),
            V2TxtToken::LeftBrace | V2TxtToken::RightBrace | V2TxtToken::Equals => None,
        }
    }

    /// Numeric view of the value. Quoted or bare numerals that the tokenizer
    /// kept as text (e.g. `"0.5"`) are parsed as well.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            TokenValue::Int(i) => Some(*i as f32),
            TokenValue::Float(f) => Some(*f),
            TokenValue::Identifier(s) | TokenValue::Str(s) => {
                s.parse().ok().filter(|f: &f32| f.is_finite())
            }
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            TokenValue::Int(i) => Some(*i),
            TokenValue::Float(_) => None,
            TokenValue::Identifier(s) | TokenValue::Str(s) => s.parse().ok(),
        }
    }

    /// Textual view for identifier-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Identifier(s) | TokenValue::Str(s) => Some(s),
            TokenValue::Int(_) | TokenValue::Float(_) => None,
        }
    }

    /// Renders any value as text, numbers included.
    pub fn to_text(&self) -> String {
        match self {
            TokenValue::Identifier(s) | TokenValue::Str(s) => s.clone(),
            TokenValue::Int(i) => i.to_string(),
            TokenValue::Float(f) => f.to_string(),
        }
    }
}

/// One step of a walk over a token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// `key = value`
    KeyValue {
        key: String,
        value: TokenValue,
        line: u32,
    },
    /// `key = {`. The opening brace has been consumed; the caller reads the
    /// group's entries until [`TokenGenerator::next_entry`] returns `None`,
    /// or skips the group with [`TokenGenerator::discard_group`].
    KeyGroup { key: String, line: u32 },
    /// A bare value inside a list, e.g. the names in `{ "Marengo" "Jena" }`.
    Value { value: TokenValue, line: u32 },
    /// A `{` without a key. Read or discard it like [`Entry::KeyGroup`].
    Group { line: u32 },
}

/// A stashed, replayable run of tokens (the inside of one group).
#[derive(Debug, Clone)]
pub struct TokenSpan {
    tokens: Rc<[LineToken]>,
    start: usize,
    end: usize,
}

impl TokenSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Line of the first token in the span, or 0 for an empty span.
    pub fn line(&self) -> u32 {
        self.tokens
            .get(self.start)
            .filter(|_| !self.is_empty())
            .map(|t| t.line)
            .unwrap_or(0)
    }
}

/// Hands out script entries one at a time.
///
/// The generator tracks brace depth: inside a group, `next_entry` returns
/// `None` when it consumes the group's closing brace; at the top level it
/// returns `None` at the end of input.
///
/// A group left open at the end of input is reported once, as an
/// [`ParseError::UnexpectedEof`] from `next_entry`, whether it was being
/// read entry by entry or skipped with `discard_group`/`capture_group`.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    tokens: Rc<[LineToken]>,
    pos: usize,
    end: usize,
    depth: usize,
    /// Line of a group that a skip ran off the end of, not yet reported.
    unclosed: Option<u32>,
}

impl TokenGenerator {
    pub fn new(tokens: Vec<LineToken>) -> Self {
        let end = tokens.len();
        TokenGenerator {
            tokens: tokens.into(),
            pos: 0,
            end,
            depth: 0,
            unclosed: None,
        }
    }

    /// Tokenizes text held in memory.
    pub fn from_text(contents: &str) -> Self {
        Self::new(DefaultV2Txt::tokenize(contents))
    }

    /// Replays a span captured earlier as if it were a whole file.
    pub fn from_span(span: &TokenSpan) -> Self {
        TokenGenerator {
            tokens: Rc::clone(&span.tokens),
            pos: span.start,
            end: span.end,
            depth: 0,
            unclosed: None,
        }
    }

    /// Line of the next unread token (or of the last token at the end).
    pub fn current_line(&self) -> u32 {
        self.tokens
            .get(self.pos.min(self.end.saturating_sub(1)))
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn peek(&self) -> Option<&LineToken> {
        if self.pos < self.end {
            self.tokens.get(self.pos)
        } else {
            None
        }
    }

    /// Returns the next entry of the current group.
    pub fn next_entry(&mut self) -> Option<Result<Entry, ParseError>> {
        if let Some(line) = self.unclosed.take() {
            return Some(Err(ParseError::UnexpectedEof { line }));
        }
        let Some(tok) = self.peek().cloned() else {
            if self.depth > 0 {
                self.depth = 0;
                return Some(Err(ParseError::UnexpectedEof {
                    line: self.current_line(),
                }));
            }
            return None;
        };
        self.pos += 1;

        match tok.token {
            V2TxtToken::RightBrace => {
                if self.depth == 0 {
                    Some(Err(ParseError::UnexpectedToken {
                        line: tok.line,
                        token: "}".to_string(),
                        expected: "a key or value".to_string(),
                    }))
                } else {
                    self.depth -= 1;
                    None
                }
            }
            V2TxtToken::LeftBrace => {
                self.depth += 1;
                Some(Ok(Entry::Group { line: tok.line }))
            }
            V2TxtToken::Equals => Some(Err(ParseError::UnexpectedToken {
                line: tok.line,
                token: "=".to_string(),
                expected: "a key before '='".to_string(),
            })),
            ref scalar => {
                // the match arms above cover every non-scalar token
                let value = TokenValue::from_token(scalar)?;
                if !matches!(self.peek().map(|t| &t.token), Some(V2TxtToken::Equals)) {
                    return Some(Ok(Entry::Value {
                        value,
                        line: tok.line,
                    }));
                }
                self.pos += 1; // consume =

                let key = value.to_text();
                let rhs = self.peek().map(|t| t.token.clone());
                match rhs {
                    Some(V2TxtToken::LeftBrace) => {
                        self.pos += 1;
                        self.depth += 1;
                        Some(Ok(Entry::KeyGroup {
                            key,
                            line: tok.line,
                        }))
                    }
                    Some(ref rhs_tok) => match TokenValue::from_token(rhs_tok) {
                        Some(value) => {
                            self.pos += 1;
                            Some(Ok(Entry::KeyValue {
                                key,
                                value,
                                line: tok.line,
                            }))
                        }
                        // leave `}` / `=` in place so the enclosing group still closes
                        None => Some(Err(ParseError::MissingRhs {
                            line: tok.line,
                            key,
                        })),
                    },
                    None => Some(Err(ParseError::MissingRhs {
                        line: tok.line,
                        key,
                    })),
                }
            }
        }
    }

    /// Scans to the brace closing the current group and consumes it.
    /// Returns the index of that closing brace (or the end of input).
    fn skip_to_group_end(&mut self) -> usize {
        let mut nested = 0usize;
        while let Some(tok) = self.peek() {
            match tok.token {
                V2TxtToken::LeftBrace => nested += 1,
                V2TxtToken::RightBrace if nested == 0 => {
                    let close = self.pos;
                    self.pos += 1;
                    self.depth = self.depth.saturating_sub(1);
                    return close;
                }
                V2TxtToken::RightBrace => nested -= 1,
                _ => {}
            }
            self.pos += 1;
        }
        self.unclosed = Some(self.current_line());
        self.depth = 0;
        self.end
    }

    /// Skips the rest of the current group, closing brace included.
    ///
    /// Call right after an [`Entry::KeyGroup`] or [`Entry::Group`] to bypass
    /// a block without aborting the caller. If the input ends first, the next
    /// `next_entry` call returns the [`ParseError::UnexpectedEof`].
    pub fn discard_group(&mut self) {
        self.skip_to_group_end();
    }

    /// Like [`TokenGenerator::discard_group`], but returns the skipped
    /// contents so they can be replayed later with
    /// [`TokenGenerator::from_span`].
    pub fn capture_group(&mut self) -> TokenSpan {
        let start = self.pos;
        let end = self.skip_to_group_end();
        TokenSpan {
            tokens: Rc::clone(&self.tokens),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<V2TxtToken> {
        DefaultV2Txt::tokenize(text)
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn nonexistent() {
        let r = DefaultV2Txt::open_txt(Path::new("path/to/nowhere"));
        assert!(r.is_err());
    }

    #[test]
    fn test_numbers_and_dates() {
        let toks = kinds("a = 1 b = -0.25 c = 1836.1.1");
        assert_eq!(toks[2], V2TxtToken::IntValue(1));
        assert_eq!(toks[5], V2TxtToken::FloatValue(-0.25));
        assert_eq!(toks[8], V2TxtToken::Identifier("1836.1.1".to_string()));
    }

    #[test]
    fn test_nan_like_words_stay_identifiers() {
        let toks = kinds("NAN INF nan");
        assert!(toks.iter().all(|t| matches!(t, V2TxtToken::Identifier(_))));
    }

    #[test]
    fn test_line_numbers_skip_comments() {
        let toks = DefaultV2Txt::tokenize("# header\nFRA = \"France\"\n\nENG = England");
        assert_eq!(toks[0].line, 2);
        assert_eq!(toks[3].line, 4);
    }

    #[test]
    fn test_key_group_ends_with_none() {
        let mut tg = TokenGenerator::from_text("outer = { a = 1 } after = 2");
        assert!(matches!(
            tg.next_entry(),
            Some(Ok(Entry::KeyGroup { ref key, .. })) if key == "outer"
        ));
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyValue { .. }))));
        assert!(tg.next_entry().is_none());
        assert!(matches!(
            tg.next_entry(),
            Some(Ok(Entry::KeyValue { ref key, .. })) if key == "after"
        ));
        assert!(tg.next_entry().is_none());
    }

    #[test]
    fn test_discard_nested_group() {
        let mut tg = TokenGenerator::from_text("skip = { x = { y = 1 } z = 2 } keep = 3");
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
        tg.discard_group();
        assert!(matches!(
            tg.next_entry(),
            Some(Ok(Entry::KeyValue { ref key, .. })) if key == "keep"
        ));
    }

    #[test]
    fn test_missing_rhs_keeps_group_closable() {
        let mut tg = TokenGenerator::from_text("g = { a = } b = 1");
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
        assert!(matches!(
            tg.next_entry(),
            Some(Err(ParseError::MissingRhs { .. }))
        ));
        assert!(tg.next_entry().is_none());
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyValue { .. }))));
    }

    #[test]
    fn test_unclosed_group_reports_eof_once() {
        let mut tg = TokenGenerator::from_text("g = { a = 1");
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyValue { .. }))));
        assert!(matches!(
            tg.next_entry(),
            Some(Err(ParseError::UnexpectedEof { .. }))
        ));
        assert!(tg.next_entry().is_none());
    }

    #[test]
    fn test_discard_past_end_reports_eof() {
        let mut tg = TokenGenerator::from_text("g = {\n  a = { b = 1 }\n  c = 2\n");
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
        tg.discard_group();
        assert!(matches!(
            tg.next_entry(),
            Some(Err(ParseError::UnexpectedEof { line: 3 }))
        ));
        assert!(tg.next_entry().is_none());
    }

    #[test]
    fn test_capture_past_end_reports_eof() {
        let mut tg = TokenGenerator::from_text("g = { a = 1");
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
        let span = tg.capture_group();
        assert_eq!(span.len(), 3);
        assert!(matches!(
            tg.next_entry(),
            Some(Err(ParseError::UnexpectedEof { .. }))
        ));
        assert!(tg.next_entry().is_none());

        // the captured part still replays cleanly
        let mut replay = TokenGenerator::from_span(&span);
        assert!(matches!(replay.next_entry(), Some(Ok(Entry::KeyValue { .. }))));
        assert!(replay.next_entry().is_none());
    }

    #[test]
    fn test_closed_discard_leaves_nothing_pending() {
        let mut tg = TokenGenerator::from_text("g = { a = 1 }");
        assert!(matches!(tg.next_entry(), Some(Ok(Entry::KeyGroup { .. }))));
        tg.discard_group();
        assert!(tg.next_entry().is_none());
    }
}
