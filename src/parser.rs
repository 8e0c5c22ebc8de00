//! Properties parser that builds a [`Properties`] store from tokens
//!
//! The parser pulls tokens from any source of `Result<Token, LexError>`,
//! normally a [`PropertiesLexer`]. Each record is a run of comments
//! followed by a key, an optional delimiter and a value.

use crate::error::{LexError, ParseError, Position, PropertiesError};
use crate::lexer::{LexerConfig, PropertiesLexer, Token, TokenKind};
use crate::properties::{CommentBlock, Properties};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Properties parser over a token source
pub struct PropertiesParser<'a, I>
where
    I: Iterator<Item = Result<Token<'a>, LexError>>,
{
    tokens: I,
    /// Comments read since the last key
    pending_comments: CommentBlock,
    properties: Properties,
    /// Position of the last token, used when the source runs dry
    last_position: Position,
    records: usize,
}

impl<'a> PropertiesParser<'a, PropertiesLexer<'a>> {
    /// Creates a parser over `input` with default lexer configuration
    pub fn from_source(input: &'a str) -> Self {
        Self::new(PropertiesLexer::new(input))
    }

    /// Creates a parser over `input` with custom lexer configuration
    pub fn with_lexer_config(input: &'a str, config: LexerConfig) -> Self {
        Self::new(PropertiesLexer::with_config(input, config))
    }
}

impl<'a, I> PropertiesParser<'a, I>
where
    I: Iterator<Item = Result<Token<'a>, LexError>>,
{
    /// Creates a parser over an arbitrary token source
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            pending_comments: CommentBlock::new(),
            properties: Properties::new(),
            last_position: Position::new(),
            records: 0,
        }
    }

    /// Pulls the next token; an exhausted source reads as end of input
    fn advance_token(&mut self) -> Result<Token<'a>, LexError> {
        match self.tokens.next() {
            Some(Ok(token)) => {
                self.last_position = token.position;
                Ok(token)
            }
            Some(Err(err)) => Err(err),
            None => Ok(Token::new(
                TokenKind::Eof,
                self.last_position,
                Cow::Borrowed(""),
            )),
        }
    }

    /// Consumes the next token, failing unless its kind is one of `expected`
    fn expect_one_of(&mut self, expected: &[TokenKind]) -> Result<Token<'a>, PropertiesError> {
        let token = self.advance_token()?;
        if expected.contains(&token.kind) {
            return Ok(token);
        }
        Err(ParseError::UnexpectedToken {
            token: token.to_string(),
            expected: describe(expected),
            line: token.position.line,
            position: token.position,
        }
        .into())
    }

    /// Parses all records and returns the filled store
    pub fn parse(mut self) -> Result<Properties, PropertiesError> {
        loop {
            let token =
                self.expect_one_of(&[TokenKind::Comment, TokenKind::Key, TokenKind::Eof])?;
            match token.kind {
                TokenKind::Comment => self.pending_comments.push(token.text.into_owned()),
                TokenKind::Key => {
                    if self.parse_assignment(token)? {
                        break;
                    }
                }
                _ => break,
            }
        }

        let trailing = std::mem::take(&mut self.pending_comments);
        self.properties.set_trailing_comments(trailing.into_vec());

        debug!(
            records = self.records,
            properties = self.properties.len(),
            trailing_comments = self.properties.trailing_comments().len(),
            "parsed properties"
        );
        Ok(self.properties)
    }

    /// Reads the delimiter and value after `key` and stores the pair.
    ///
    /// Returns true if end of input was reached in place of the value.
    fn parse_assignment(&mut self, key: Token<'a>) -> Result<bool, PropertiesError> {
        let mut token = self.expect_one_of(&[
            TokenKind::Delimiter,
            TokenKind::Value,
            TokenKind::Eof,
        ])?;
        if token.kind == TokenKind::Delimiter {
            token = self.expect_one_of(&[TokenKind::Value, TokenKind::Eof])?;
        }

        let at_end = token.kind == TokenKind::Eof;
        let value = if at_end {
            String::new()
        } else {
            token.text.into_owned()
        };

        trace!(key = %key.text, line = key.position.line, "record");
        self.records += 1;
        let comments = std::mem::take(&mut self.pending_comments);
        self.properties
            .insert_parsed(key.text.into_owned(), value, comments);
        Ok(at_end)
    }
}

/// Renders a list of token kinds as `a, b or c`
fn describe(kinds: &[TokenKind]) -> String {
    let names: Vec<&str> = kinds.iter().map(TokenKind::type_name).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}

/// Parses `.properties` text with default lexer configuration
pub fn parse(input: &str) -> Result<Properties, PropertiesError> {
    PropertiesParser::from_source(input).parse()
}

/// Parses `.properties` text with custom lexer configuration
pub fn parse_with_config(input: &str, config: LexerConfig) -> Result<Properties, PropertiesError> {
    PropertiesParser::with_lexer_config(input, config).parse()
}
