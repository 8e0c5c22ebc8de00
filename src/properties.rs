//! The ordered property store
//!
//! [`Properties`] keeps raw (unexpanded) values in first-seen key order,
//! together with the comment lines that preceded each key. Values are
//! expanded on every read, so updates made with [`Properties::set`] are
//! visible to placeholders immediately.

use crate::error::{ExpandError, PropertiesError};
use crate::expansion::{Expander, ExpansionConfig, VariableHandler};
use crate::writer::{self, WriterConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Comment lines attached to one key; most keys carry none or a couple
pub type CommentBlock = SmallVec<[String; 2]>;

/// An ordered set of properties with comments and placeholder expansion
#[derive(Clone, Default)]
pub struct Properties {
    entries: IndexMap<String, String>,
    comments: IndexMap<String, CommentBlock>,
    trailing_comments: Vec<String>,
    expansion: ExpansionConfig,
    resolver: Option<Arc<dyn VariableHandler>>,
}

impl Properties {
    /// Creates an empty store with `${key}` expansion
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the placeholder delimiters
    pub fn with_expansion(mut self, config: ExpansionConfig) -> Self {
        self.expansion = config;
        self
    }

    /// Sets the resolver for placeholders that name no property
    pub fn with_resolver(mut self, resolver: impl VariableHandler + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Replaces the placeholder delimiters
    pub fn set_expansion(&mut self, config: ExpansionConfig) {
        self.expansion = config;
    }

    /// Replaces or removes the fallback resolver
    pub fn set_resolver(&mut self, resolver: Option<Arc<dyn VariableHandler>>) {
        self.resolver = resolver;
    }

    /// Returns the placeholder delimiters
    pub fn expansion_config(&self) -> &ExpansionConfig {
        &self.expansion
    }

    /// Returns the expanded value for `key`, or `None` if the key does not exist.
    ///
    /// A malformed placeholder or a circular reference fails this call only;
    /// the raw value stays in the store.
    pub fn get(&self, key: &str) -> Result<Option<String>, ExpandError> {
        let Some(raw) = self.entries.get(key) else {
            return Ok(None);
        };
        self.expand(raw)
            .map(Some)
            .map_err(|err| err.in_property(key, raw))
    }

    /// Returns the unexpanded value for `key`
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Expands placeholders in an arbitrary string against this store
    pub fn expand(&self, input: &str) -> Result<String, ExpandError> {
        Expander::new(&self.entries, &self.expansion)
            .with_resolver(self.resolver.as_deref())
            .expand(input)
    }

    /// Returns the expanded value or `def` if the key does not exist
    pub fn get_string(&self, key: &str, def: &str) -> Result<String, ExpandError> {
        Ok(self.get(key)?.unwrap_or_else(|| def.to_string()))
    }

    /// Returns whether the expanded value is `1`, `true`, `yes` or `on`, ignoring case.
    ///
    /// Any other value is `false`; `def` is returned if the key does not exist.
    pub fn get_bool(&self, key: &str, def: bool) -> Result<bool, ExpandError> {
        Ok(match self.get(key)? {
            Some(value) => matches!(
                value.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            None => def,
        })
    }

    /// Parses the expanded value as `f64`, or returns `def`
    pub fn get_f64(&self, key: &str, def: f64) -> Result<f64, ExpandError> {
        self.get_parsed(key, def)
    }

    /// Parses the expanded value as a decimal `i64`, or returns `def`
    pub fn get_i64(&self, key: &str, def: i64) -> Result<i64, ExpandError> {
        self.get_parsed(key, def)
    }

    /// Parses the expanded value as a decimal `u64`, or returns `def`
    pub fn get_u64(&self, key: &str, def: u64) -> Result<u64, ExpandError> {
        self.get_parsed(key, def)
    }

    /// Parses the expanded value as a duration, or returns `def`.
    ///
    /// A bare integer counts milliseconds; the suffixes `ms`, `s`, `m`/`min`,
    /// `h` and `d` select the unit.
    pub fn get_duration(&self, key: &str, def: Duration) -> Result<Duration, ExpandError> {
        Ok(self
            .get(key)?
            .and_then(|value| parse_duration(&value))
            .unwrap_or(def))
    }

    fn get_parsed<T: FromStr>(&self, key: &str, def: T) -> Result<T, ExpandError> {
        Ok(self
            .get(key)?
            .and_then(|value| value.parse().ok())
            .unwrap_or(def))
    }

    /// Sets `key` to the raw `value` and returns the previous raw value.
    ///
    /// An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key` and its comments, returning the raw value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.comments.shift_remove(key);
        self.entries.shift_remove(key)
    }

    /// Returns whether `key` exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of properties; comments are not counted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no properties
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the raw key/value pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the comment lines attached to `key`
    pub fn comments(&self, key: &str) -> &[String] {
        self.comments
            .get(key)
            .map(|block| block.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces the comment lines of an existing key.
    ///
    /// Returns false and attaches nothing if the key does not exist.
    pub fn set_comments(&mut self, key: &str, comments: Vec<String>) -> bool {
        if !self.entries.contains_key(key) {
            return false;
        }
        if comments.is_empty() {
            self.comments.shift_remove(key);
        } else {
            self.comments
                .insert(key.to_string(), CommentBlock::from_vec(comments));
        }
        true
    }

    /// Returns the comment lines that follow the last key
    pub fn trailing_comments(&self) -> &[String] {
        &self.trailing_comments
    }

    /// Replaces the comment lines that follow the last key
    pub fn set_trailing_comments(&mut self, comments: Vec<String>) {
        self.trailing_comments = comments;
    }

    /// Copies all properties and comments of `other` into this store.
    ///
    /// Values from `other` win; keys new to this store are appended in `other`'s order.
    pub fn merge(&mut self, other: &Properties) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
        for (key, block) in &other.comments {
            self.comments.insert(key.clone(), block.clone());
        }
        self.trailing_comments
            .extend(other.trailing_comments.iter().cloned());
    }

    /// Returns the properties whose keys start with `prefix`
    pub fn filter_prefix(&self, prefix: &str) -> Properties {
        let mut filtered = Properties {
            expansion: self.expansion.clone(),
            resolver: self.resolver.clone(),
            ..Properties::default()
        };
        for (key, value) in self.iter().filter(|(key, _)| key.starts_with(prefix)) {
            filtered.set(key, value);
            if let Some(block) = self.comments.get(key) {
                filtered.comments.insert(key.to_string(), block.clone());
            }
        }
        filtered
    }

    /// Returns all values expanded, in key order
    pub fn expanded(&self) -> Result<IndexMap<String, String>, ExpandError> {
        self.entries
            .iter()
            .map(|(key, raw)| {
                let value = self.expand(raw).map_err(|err| err.in_property(key, raw))?;
                Ok((key.clone(), value))
            })
            .collect()
    }

    /// Expands every value and reports the first circular reference or malformed expression
    pub fn check(&self) -> Result<(), ExpandError> {
        self.expanded().map(|_| ())
    }

    /// Returns the raw `key = value` lines
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Returns the expanded `key = value` lines
    pub fn to_expanded_string(&self) -> Result<String, ExpandError> {
        let mut out = String::new();
        for (key, value) in self.expanded()? {
            out.push_str(&key);
            out.push_str(" = ");
            out.push_str(&value);
            out.push('\n');
        }
        Ok(out)
    }

    /// Writes the raw properties in `.properties` syntax and returns the byte count
    pub fn write<W: std::io::Write>(
        &self,
        writer: W,
        config: &WriterConfig,
    ) -> Result<usize, PropertiesError> {
        writer::write(self, writer, config)
    }

    /// Records a parsed assignment; a non-empty comment block replaces the stored one
    pub(crate) fn insert_parsed(&mut self, key: String, value: String, comments: CommentBlock) {
        if !comments.is_empty() {
            self.comments.insert(key.clone(), comments);
        }
        self.entries.insert(key, value);
    }
}

/// Parses an integer with an optional `ms`, `s`, `m`/`min`, `h` or `d` suffix
fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);
    let amount: u64 = number.parse().ok()?;

    match suffix.trim_start() {
        "" | "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" | "min" => amount.checked_mul(60).map(Duration::from_secs),
        "h" => amount.checked_mul(3_600).map(Duration::from_secs),
        "d" => amount.checked_mul(86_400).map(Duration::from_secs),
        _ => None,
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Properties")
            .field("entries", &self.entries)
            .field("comments", &self.comments)
            .field("trailing_comments", &self.trailing_comments)
            .field("expansion", &self.expansion)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Prints the raw `key = value` lines, the same text as [`Properties::dump`].
///
/// Placeholders are left unexpanded; use [`Properties::to_expanded_string`]
/// for the expanded lines.
impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

/// Equality compares entries, comments and placeholder delimiters, not resolvers
impl PartialEq for Properties {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
            && self.comments == other.comments
            && self.trailing_comments == other.trailing_comments
            && self.expansion == other.expansion
    }
}

impl FromStr for Properties {
    type Err = PropertiesError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(input)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        properties.extend(iter);
        properties
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Properties {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Serializes the raw values as a flat map in key order
impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
