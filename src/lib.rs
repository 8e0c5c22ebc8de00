//! # Java Properties Lexer
//!
//! A lexer, parser and writer for Java `.properties` files with Spring-style
//! `${key}` placeholder expansion.
//!
//! ## Overview
//!
//! `.properties` text is a list of key/value pairs, one per logical line,
//! with `#` and `!` comment lines. This crate reads it into an ordered
//! [`Properties`] store that remembers comments, expands placeholders on
//! read, and writes the store back out so that re-parsing gives the same
//! pairs.
//!
//! ## Key Features
//!
//! - **All delimiter styles**: `key = value`, `key: value` and `key value`
//! - **Escapes**: `\t`, `\n`, `\:`, `\=`, `\uXXXX` and line continuations
//! - **Ordered store**: keys keep the order they first appeared in
//! - **Comments**: each comment block stays attached to the key after it
//! - **Placeholder expansion**: recursive `${key}` substitution with
//!   circular reference detection and pluggable fallback resolvers
//! - **Zero-Copy Lexing**: token text borrows from the input unless an
//!   escape had to be decoded
//! - **Writer**: UTF-8 or ISO-8859-1 output with the escapes needed to
//!   read it back
//!
//! ## Basic Usage
//!
//! ```rust
//! let text = "
//! ! server settings
//! host = localhost
//! port: 8080
//! url = http://${host}:${port}/
//! ";
//!
//! let props = properties::parse(text)?;
//! assert_eq!(props.get("url")?.as_deref(), Some("http://localhost:8080/"));
//! assert_eq!(props.get_u64("port", 80)?, 8080);
//! assert_eq!(props.comments("host"), ["! server settings"]);
//! # Ok::<(), properties::PropertiesError>(())
//! ```
//!
//! ## Fallback Resolvers
//!
//! Placeholders that name no property are handed to a [`VariableHandler`].
//! Without one, or if it has no answer either, they expand to the empty
//! string.
//!
//! ```rust
//! use properties::{MapVariableHandler, Properties};
//!
//! let mut handler = MapVariableHandler::new();
//! handler.insert("APP_HOME", "/opt/app");
//!
//! let props: Properties = "log.dir = ${APP_HOME}/logs".parse()?;
//! let props = props.with_resolver(handler);
//! assert_eq!(props.get("log.dir")?.as_deref(), Some("/opt/app/logs"));
//! # Ok::<(), properties::PropertiesError>(())
//! ```
//!
//! ## Error Handling
//!
//! Lexical and parse errors carry the position of the offending input and
//! abort the whole parse. Expansion errors only fail the `get` call that hit
//! them; the raw value stays in the store.
//!
//! ```rust
//! use properties::{ExpandError, LexError, PropertiesError};
//!
//! match properties::parse("key = \\u12") {
//!     Err(PropertiesError::Lex(LexError::InvalidUnicodeLiteral { position, .. })) => {
//!         assert_eq!(position.line, 1);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//!
//! let props = properties::parse("a = ${b}\nb = ${a}")?;
//! assert!(matches!(props.get("a"), Err(ExpandError::CircularReference { .. })));
//! assert_eq!(props.get_raw("a"), Some("${b}"));
//! # Ok::<(), PropertiesError>(())
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use properties::{Encoding, WriterConfig};
//!
//! let props = properties::parse("key\\u2318 = value")?;
//! let mut out = Vec::new();
//! let config = WriterConfig::new().with_encoding(Encoding::Iso8859_1);
//! props.write(&mut out, &config)?;
//! assert_eq!(out, b"key\\u2318 = value\n");
//! # Ok::<(), properties::PropertiesError>(())
//! ```

pub mod error;
pub mod expansion;
pub mod lexer;
pub mod parser;
pub mod properties;
pub mod writer;

// Re-export main types and functions
pub use error::{ExpandError, LexError, ParseError, Position, PropertiesError};
pub use lexer::{LexerConfig, PropertiesLexer, Token, TokenKind};
pub use parser::{PropertiesParser, parse, parse_with_config};
pub use properties::{CommentBlock, Properties};
pub use writer::{Encoding, WriterConfig, to_string, to_string_with_config, to_writer, write};

// Re-export expansion types
pub use expansion::{
    ChainedVariableHandler, EnvironmentVariableHandler, ExpansionConfig, ExpansionContext,
    Expander, MapVariableHandler, PropertySource, VariableHandler, expand,
};
