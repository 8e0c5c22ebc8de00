//! Writer that re-encodes a [`Properties`] store as `.properties` text
//!
//! Every key is written as `key = value` on its own line, in store order.
//! Raw values are written, never expanded ones. Characters that would change
//! meaning when read back are escaped, so parsing the output yields the same
//! pairs again.

use crate::error::PropertiesError;
use crate::properties::Properties;
use std::fmt::Write as _;
use std::io::Write;

/// Target character encoding of the written text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Every character is written literally as UTF-8
    #[default]
    Utf8,
    /// One byte per character; characters above `U+00FF` become `\uXXXX`
    /// and characters above `U+FFFF` become `?`
    Iso8859_1,
}

impl Encoding {
    /// Appends `c` to `out`, replacing it if the encoding cannot represent it
    fn push_char(self, c: char, out: &mut String) {
        match self {
            Encoding::Utf8 => out.push(c),
            Encoding::Iso8859_1 => match u32::from(c) {
                0..=0xff => out.push(c),
                code @ 0x100..=0xffff => {
                    let _ = write!(out, "\\u{:04x}", code);
                }
                _ => out.push('?'),
            },
        }
    }

    /// Converts rendered text into output bytes
    fn to_bytes(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            // rendered text only holds chars below U+0100 here
            Encoding::Iso8859_1 => text.chars().map(|c| u32::from(c) as u8).collect(),
        }
    }
}

/// Configuration options for the writer
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    pub encoding: Encoding,
    /// Write each key's comment lines before it, and trailing comments at the end.
    ///
    /// Comment text is never unescaped when read back. Under
    /// [`Encoding::Iso8859_1`] a comment character above `U+00FF` is written
    /// as a literal `\uXXXX` and one above `U+FFFF` as `?`, so such comments
    /// do not survive a round trip unchanged.
    pub write_comments: bool,
}

impl WriterConfig {
    /// Creates the default configuration: UTF-8 without comments
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets whether comments are written
    pub fn with_comments(mut self, write_comments: bool) -> Self {
        self.write_comments = write_comments;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Key,
    Value,
}

/// Appends `text` to `out` with the escapes needed for `part`
fn encode(text: &str, part: Part, encoding: Encoding, out: &mut String) {
    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' | ':' | '=' if part == Part::Key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if part == Part::Key && index == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if index == 0 => out.push_str("\\ "),
            _ => encoding.push_char(c, out),
        }
    }
}

fn push_comment(comment: &str, encoding: Encoding, out: &mut String) {
    for c in comment.chars() {
        encoding.push_char(c, out);
    }
    out.push('\n');
}

/// Renders the whole store as text restricted to the encoding's repertoire
pub fn to_string_with_config(properties: &Properties, config: &WriterConfig) -> String {
    let mut out = String::new();
    for (key, value) in properties.iter() {
        if config.write_comments {
            for comment in properties.comments(key) {
                push_comment(comment, config.encoding, &mut out);
            }
        }
        encode(key, Part::Key, config.encoding, &mut out);
        out.push_str(" = ");
        encode(value, Part::Value, config.encoding, &mut out);
        out.push('\n');
    }
    if config.write_comments {
        for comment in properties.trailing_comments() {
            push_comment(comment, config.encoding, &mut out);
        }
    }
    out
}

/// Writes the store to `writer` and returns the number of bytes written
pub fn write<W: Write>(
    properties: &Properties,
    mut writer: W,
    config: &WriterConfig,
) -> Result<usize, PropertiesError> {
    let text = to_string_with_config(properties, config);
    let bytes = config.encoding.to_bytes(&text);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}

/// Renders the store as UTF-8 text without comments
pub fn to_string(properties: &Properties) -> String {
    to_string_with_config(properties, &WriterConfig::default())
}

/// Writes the store as UTF-8 text without comments
pub fn to_writer<W: Write>(properties: &Properties, writer: W) -> Result<usize, PropertiesError> {
    write(properties, writer, &WriterConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn written(input: &str, encoding: Encoding) -> Vec<u8> {
        let p = parse(input).unwrap();
        let mut buf = Vec::new();
        let config = WriterConfig::new().with_encoding(encoding);
        let n = write(&p, &mut buf, &config).unwrap();
        assert_eq!(n, buf.len());
        buf
    }

    #[test]
    fn test_write_both_encodings() {
        let cases = [
            ("key = value", "key = value\n"),
            ("key = value\nkey2 = value2", "key = value\nkey2 = value2\n"),
            ("key = valueA,\\\n    valueB", "key = valueA,valueB\n"),
            ("key = valueA,\\\n\t\tvalueB", "key = valueA,valueB\n"),
            ("ke\\ \\:y = value", "ke\\ \\:y = value\n"),
            ("key = \\\\value", "key = \\\\value\n"),
            ("key = a\\tb\\nc", "key = a\\tb\\nc\n"),
        ];
        for (input, expected) in cases {
            for encoding in [Encoding::Utf8, Encoding::Iso8859_1] {
                assert_eq!(
                    written(input, encoding),
                    expected.as_bytes(),
                    "input {:?} {:?}",
                    input,
                    encoding
                );
            }
        }
    }

    #[test]
    fn test_write_iso8859_1_unicode_literals() {
        assert_eq!(
            written("key\\u2318 = value", Encoding::Iso8859_1),
            b"key\\u2318 = value\n"
        );
        assert_eq!(
            written("key = value\\u2318", Encoding::Iso8859_1),
            b"key = value\\u2318\n"
        );
        assert_eq!(written("key = ä", Encoding::Iso8859_1), b"key = \xe4\n");
    }

    #[test]
    fn test_write_iso8859_1_above_bmp_is_lossy() {
        assert_eq!(written("key = a😀b", Encoding::Iso8859_1), b"key = a?b\n");
    }

    #[test]
    fn test_write_utf8_passthrough() {
        assert_eq!(
            written("key\\u2318 = ä😀", Encoding::Utf8),
            "key⌘ = ä😀\n".as_bytes()
        );
    }

    #[test]
    fn test_escapes_key_markers_and_value_leading_space() {
        let mut p = Properties::new();
        p.set("#not-a-comment", " padded");
        p.set("a=b", "x=y: z");
        let text = to_string(&p);
        assert_eq!(
            text,
            "\\#not-a-comment = \\ padded\na\\=b = x=y: z\n"
        );
        let back = parse(&text).unwrap();
        assert_eq!(back.iter().collect::<Vec<_>>(), p.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_key_and_value_survive() {
        let mut p = Properties::new();
        p.set("", "empty key");
        p.set("empty", "");
        let back = parse(&to_string(&p)).unwrap();
        assert_eq!(back.get_raw(""), Some("empty key"));
        assert_eq!(back.get_raw("empty"), Some(""));
    }

    #[test]
    fn test_write_comments() {
        let p = parse("# about a\na = 1\nb = 2\n! the end").unwrap();
        let config = WriterConfig::new().with_comments(true);
        assert_eq!(
            to_string_with_config(&p, &config),
            "# about a\na = 1\nb = 2\n! the end\n"
        );
        assert_eq!(to_string(&p), "a = 1\nb = 2\n");
    }

    #[test]
    fn test_iso8859_1_comments_are_lossy() {
        let p = parse("# caf\\u00e9 \\u2318 😀\na = 1").unwrap();
        assert_eq!(p.comments("a"), ["# caf\\u00e9 \\u2318 😀".to_string()]);

        let mut p = Properties::new();
        p.set("a", "1");
        p.set_comments("a", vec!["# café ⌘ 😀".to_string()]);
        let config = WriterConfig::new()
            .with_encoding(Encoding::Iso8859_1)
            .with_comments(true);
        let mut buf = Vec::new();
        write(&p, &mut buf, &config).unwrap();
        assert_eq!(buf, b"# caf\xe9 \\u2318 ?\na = 1\n");

        let text: String = buf.iter().map(|&b| char::from(b)).collect();
        let back = parse(&text).unwrap();
        assert_eq!(back.comments("a"), ["# café \\u2318 ?".to_string()]);
        assert_eq!(back.get_raw("a"), Some("1"));
    }

    #[test]
    fn test_raw_values_are_written() {
        let p = parse("a = 1\nb = ${a}").unwrap();
        assert_eq!(to_string(&p), "a = 1\nb = ${a}\n");
    }

    #[test]
    fn test_to_writer_counts_bytes() {
        let p = parse("k = ä").unwrap();
        let mut buf = Vec::new();
        assert_eq!(to_writer(&p, &mut buf).unwrap(), 7);
        assert_eq!(p.write(&mut Vec::new(), &WriterConfig::default()).unwrap(), 7);
    }
}
