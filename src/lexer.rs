//! Properties lexer for tokenizing `.properties` text
//!
//! The lexer alternates between scanning a key, an optional delimiter and a
//! value. Tokens are produced lazily, one per call to
//! [`PropertiesLexer::next_token`], and the lexer keeps no token history.

use crate::error::{LexError, Position};
use std::borrow::Cow;
use std::fmt;
use tracing::trace;

/// Configuration options for the lexer
#[derive(Debug, Clone)]
pub struct LexerConfig {
    /// Emit comment lines as [`TokenKind::Comment`] tokens
    pub save_comments: bool,
    /// Keep the whitespace in front of the comment marker in the comment text
    pub preserve_comment_indent: bool,
}

impl LexerConfig {
    /// Creates a new lexer configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether comment lines are emitted
    pub fn with_save_comments(mut self, save: bool) -> Self {
        self.save_comments = save;
        self
    }

    /// Sets whether comment indentation is preserved
    pub fn with_preserve_comment_indent(mut self, preserve: bool) -> Self {
        self.preserve_comment_indent = preserve;
        self
    }
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            save_comments: true,
            preserve_comment_indent: false,
        }
    }
}

/// Kinds of lexical items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A property key with escapes decoded
    Key,
    /// An explicit `=` or `:` delimiter
    Delimiter,
    /// A property value with escapes and continuations decoded
    Value,
    /// A comment line including its `#` or `!` marker
    Comment,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns a string representation of the token kind for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKind::Key => "key",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Value => "value",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A lexical item together with where it starts in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub position: Position,
    /// Decoded text; borrows from the input when nothing had to be unescaped
    pub text: Cow<'a, str>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, position: Position, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            kind,
            position,
            text: text.into(),
        }
    }

    /// Returns the byte offset of the token in the input
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    /// Converts the token into one that owns its text
    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            position: self.position,
            text: Cow::Owned(self.text.into_owned()),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            return f.write_str(self.kind.type_name());
        }
        if self.text.chars().count() > 10 {
            let head: String = self.text.chars().take(10).collect();
            write!(f, "{} {:?}...", self.kind.type_name(), head)
        } else {
            write!(f, "{} {:?}", self.kind.type_name(), self.text)
        }
    }
}

/// Scanner state between two calls to `next_token`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Key,
    Delimiter,
    Value,
    Done,
}

/// Properties lexer for tokenizing input text
#[derive(Clone)]
pub struct PropertiesLexer<'a> {
    /// Input text being lexed
    input: &'a str,
    /// Cursor; its line counter only ever moves forward
    position: Position,
    /// Cached current character
    current_char: Option<char>,
    /// Lexer configuration
    config: LexerConfig,
    state: State,
    /// Set once the iterator has yielded end of input or an error
    exhausted: bool,
    token_count: usize,
}

/// Whitespace that separates keys, delimiters and values. Newlines are not part of it.
#[inline(always)]
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\x0c')
}

#[inline(always)]
fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r')
}

#[inline(always)]
fn is_key_terminator(ch: char) -> bool {
    is_whitespace(ch) || ch == ':' || ch == '='
}

/// Maps the character after a backslash to the character it stands for.
/// Unknown escapes drop the backslash and keep the character.
#[inline(always)]
fn unescape(ch: char) -> char {
    match ch {
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

impl<'a> PropertiesLexer<'a> {
    /// Creates a new lexer with default configuration
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, LexerConfig::default())
    }

    /// Creates a new lexer with custom configuration
    pub fn with_config(input: &'a str, config: LexerConfig) -> Self {
        let mut lexer = Self {
            input,
            position: Position::new(),
            current_char: None,
            config,
            state: State::Key,
            exhausted: false,
            token_count: 0,
        };
        lexer.current_char = lexer.peek_char();
        lexer
    }

    /// Returns the current position in the input
    #[inline(always)]
    pub fn current_position(&self) -> Position {
        self.position
    }

    /// Returns the underlying source text
    #[inline(always)]
    pub fn source(&self) -> &'a str {
        self.input
    }

    /// Returns the number of tokens produced so far
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Peeks at the current character without advancing
    #[inline(always)]
    pub fn peek_char(&self) -> Option<char> {
        self.input[self.position.offset..].chars().next()
    }

    /// Advances to the next character and returns it
    #[inline(always)]
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current_char?;
        let next = if ch == '\r' {
            self.input[self.position.offset + 1..].chars().next()
        } else {
            None
        };
        self.position.advance(ch, next);
        self.current_char = self.peek_char();
        Some(ch)
    }

    /// Skips spaces, tabs and form feeds
    #[inline(always)]
    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if !is_whitespace(ch) {
                break;
            }
            self.advance();
        }
    }

    /// Consumes one `\n`, `\r` or `\r\n` if the cursor is on one
    fn consume_line_terminator(&mut self) {
        match self.current_char {
            Some('\r') => {
                self.advance();
                if self.current_char == Some('\n') {
                    self.advance();
                }
            }
            Some('\n') => {
                self.advance();
            }
            _ => {}
        }
    }

    fn emit(&mut self, kind: TokenKind, position: Position, text: Cow<'a, str>) -> Token<'a> {
        self.token_count += 1;
        trace!(?kind, line = position.line, offset = position.offset, text = %text, "token");
        Token {
            kind,
            position,
            text,
        }
    }

    /// Produces the next token.
    ///
    /// After end of input has been returned, further calls keep returning
    /// [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        let result = match self.state {
            State::Key => self.lex_key(),
            State::Delimiter => self.lex_delimiter(),
            State::Value => self.lex_value(),
            State::Done => Ok(self.emit(TokenKind::Eof, self.position, Cow::Borrowed(""))),
        };
        if result.is_err() {
            self.state = State::Done;
        }
        result
    }

    /// Scans blank lines and comments up to the next key or end of input
    fn lex_key(&mut self) -> Result<Token<'a>, LexError> {
        loop {
            let line_start = self.position.offset;
            self.skip_whitespace();
            let start = self.current_position();

            match self.current_char {
                None => {
                    self.state = State::Done;
                    return Ok(self.emit(TokenKind::Eof, start, Cow::Borrowed("")));
                }
                Some(ch) if is_line_terminator(ch) => {
                    self.consume_line_terminator();
                }
                Some('#') | Some('!') => {
                    let text_start = if self.config.preserve_comment_indent {
                        line_start
                    } else {
                        start.offset
                    };
                    while let Some(ch) = self.current_char {
                        if is_line_terminator(ch) {
                            break;
                        }
                        self.advance();
                    }
                    let text = &self.input[text_start..self.position.offset];
                    self.consume_line_terminator();
                    if self.config.save_comments {
                        return Ok(self.emit(TokenKind::Comment, start, Cow::Borrowed(text)));
                    }
                }
                Some(_) => {
                    let key = self.scan_text(true)?;
                    self.state = State::Delimiter;
                    return Ok(self.emit(TokenKind::Key, start, key));
                }
            }
        }
    }

    /// Scans the optional `=` or `:` after a key.
    ///
    /// Without an explicit delimiter the value follows directly, so the value
    /// token is returned instead.
    fn lex_delimiter(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace();
        let start = self.current_position();
        match self.current_char {
            Some(':') | Some('=') => {
                self.advance();
                self.state = State::Value;
                let text = &self.input[start.offset..self.position.offset];
                Ok(self.emit(TokenKind::Delimiter, start, Cow::Borrowed(text)))
            }
            _ => self.lex_value(),
        }
    }

    /// Scans a value up to the end of its logical line
    fn lex_value(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace();
        let start = self.current_position();
        let value = self.scan_text(false)?;
        self.consume_line_terminator();
        self.state = State::Key;
        Ok(self.emit(TokenKind::Value, start, value))
    }

    /// Accumulates key or value text, decoding escapes and line continuations.
    ///
    /// Stops before a line terminator or end of input, and for keys also
    /// before an unescaped whitespace, `:` or `=`.
    fn scan_text(&mut self, is_key: bool) -> Result<Cow<'a, str>, LexError> {
        let input = self.input;
        let start = self.position.offset;
        let mut decoded: Option<String> = None;

        while let Some(ch) = self.current_char {
            if is_line_terminator(ch) || (is_key && is_key_terminator(ch)) {
                break;
            }

            if ch != '\\' {
                if let Some(buf) = decoded.as_mut() {
                    buf.push(ch);
                }
                self.advance();
                continue;
            }

            let buf =
                decoded.get_or_insert_with(|| input[start..self.position.offset].to_string());
            let escape_position = self.current_position();
            self.advance();

            match self.current_char {
                None => {
                    return Err(LexError::PrematureEof {
                        position: escape_position,
                    });
                }
                Some(next) if is_line_terminator(next) => {
                    // line continuation
                    self.consume_line_terminator();
                    self.skip_whitespace();
                }
                Some(marker @ ('u' | 'U')) => {
                    self.advance();
                    let decoded_char = self.scan_unicode_literal(marker, escape_position)?;
                    buf.push(decoded_char);
                }
                Some(escaped) => {
                    self.advance();
                    buf.push(unescape(escaped));
                }
            }
        }

        Ok(match decoded {
            Some(text) => Cow::Owned(text),
            None => Cow::Borrowed(&input[start..self.position.offset]),
        })
    }

    /// Scans the four hex digits of a `\uXXXX` literal; the cursor is on the first digit
    fn scan_unicode_literal(&mut self, marker: char, position: Position) -> Result<char, LexError> {
        let mut hex_digits = String::with_capacity(4);

        for _ in 0..4 {
            match self.current_char {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    hex_digits.push(ch);
                    self.advance();
                }
                Some(ch) => {
                    return Err(LexError::InvalidUnicodeLiteral {
                        sequence: format!("{}{}{}", marker, hex_digits, ch),
                        position,
                    });
                }
                None => {
                    return Err(LexError::InvalidUnicodeLiteral {
                        sequence: format!("{}{}", marker, hex_digits),
                        position,
                    });
                }
            }
        }

        u32::from_str_radix(&hex_digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexError::InvalidUnicodeLiteral {
                sequence: format!("{}{}", marker, hex_digits),
                position,
            })
    }
}

impl<'a> Iterator for PropertiesLexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    /// Yields every token up to and including end of input, or up to the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(token) if token.kind == TokenKind::Eof => self.exhausted = true,
            Err(_) => self.exhausted = true,
            Ok(_) => {}
        }
        Some(result)
    }
}
