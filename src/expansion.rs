//! Placeholder expansion for property values
//!
//! Values may reference other properties with `${key}` placeholders. The
//! expander resolves them left to right against a [`PropertySource`] and
//! falls back to an optional [`VariableHandler`]. Each resolved value is
//! spliced into the text, which is then scanned again from the start. A key
//! may be substituted at most once per expansion; a second substitution is a
//! circular reference.

use crate::error::ExpandError;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Placeholder delimiters used for expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionConfig {
    /// Opens a placeholder, `${` by default
    pub prefix: String,
    /// Closes a placeholder, `}` by default
    pub postfix: String,
}

impl ExpansionConfig {
    /// Creates the default `${key}` configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that leaves every value untouched
    pub fn disabled() -> Self {
        Self {
            prefix: String::new(),
            postfix: String::new(),
        }
    }

    /// Sets the placeholder prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the placeholder postfix
    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = postfix.into();
        self
    }

    /// Expansion runs only when both delimiters are non-empty
    pub fn is_enabled(&self) -> bool {
        !self.prefix.is_empty() && !self.postfix.is_empty()
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            prefix: "${".to_string(),
            postfix: "}".to_string(),
        }
    }
}

/// Keys already substituted during one top-level expansion
///
/// A key is never removed once seen, so substituting the same key twice in
/// one expansion is reported as a circular reference.
#[derive(Debug, Clone, Default)]
pub struct ExpansionContext {
    /// Substituted keys in the order they were first resolved
    pub seen_keys: IndexSet<String>,
}

impl ExpansionContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as substituted, failing if it already was
    pub fn mark_seen(&mut self, key: &str) -> Result<(), ExpandError> {
        if self.seen_keys.contains(key) {
            return Err(ExpandError::CircularReference {
                key: key.to_string(),
                chain: self.seen_keys.iter().cloned().collect(),
                property: None,
            });
        }
        self.seen_keys.insert(key.to_string());
        Ok(())
    }

    /// Returns whether `key` has been substituted already
    pub fn is_seen(&self, key: &str) -> bool {
        self.seen_keys.contains(key)
    }

    /// Returns the number of substitutions made so far
    pub fn seen_count(&self) -> usize {
        self.seen_keys.len()
    }
}

/// Fallback resolver for placeholders the properties themselves do not define
pub trait VariableHandler: Send + Sync {
    /// Resolves a variable by name
    fn resolve_variable(&self, name: &str) -> Option<String>;

    /// Resolves a variable with the chain of keys currently being expanded
    fn resolve_variable_with_context(
        &self,
        name: &str,
        _context: &ExpansionContext,
    ) -> Option<String> {
        self.resolve_variable(name)
    }
}

/// Resolves placeholders from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentVariableHandler;

impl VariableHandler for EnvironmentVariableHandler {
    fn resolve_variable(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Map-based variable handler
#[derive(Debug, Clone, Default)]
pub struct MapVariableHandler {
    variables: HashMap<String, String>,
}

impl MapVariableHandler {
    /// Creates a new map variable handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handler from an existing map
    pub fn from_map(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    /// Inserts a variable
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Gets a reference to the internal map
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }
}

impl VariableHandler for MapVariableHandler {
    fn resolve_variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }
}

/// Chained variable handler that tries multiple handlers in order
#[derive(Default)]
pub struct ChainedVariableHandler {
    handlers: Vec<Box<dyn VariableHandler>>,
}

impl ChainedVariableHandler {
    /// Creates a new chained handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler to the chain
    pub fn add_handler(&mut self, handler: Box<dyn VariableHandler>) {
        self.handlers.push(handler);
    }

    /// Creates a chained handler from a vector of handlers
    pub fn from_handlers(handlers: Vec<Box<dyn VariableHandler>>) -> Self {
        Self { handlers }
    }
}

impl VariableHandler for ChainedVariableHandler {
    fn resolve_variable(&self, name: &str) -> Option<String> {
        self.handlers
            .iter()
            .find_map(|handler| handler.resolve_variable(name))
    }

    fn resolve_variable_with_context(
        &self,
        name: &str,
        context: &ExpansionContext,
    ) -> Option<String> {
        self.handlers
            .iter()
            .find_map(|handler| handler.resolve_variable_with_context(name, context))
    }
}

/// Raw values that placeholders are resolved against
pub trait PropertySource {
    /// Returns the unexpanded value stored under `key`
    fn raw_value(&self, key: &str) -> Option<&str>;
}

impl PropertySource for IndexMap<String, String> {
    fn raw_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl PropertySource for HashMap<String, String> {
    fn raw_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Expands placeholders in values against a property source
pub struct Expander<'s, S: PropertySource + ?Sized> {
    source: &'s S,
    config: &'s ExpansionConfig,
    resolver: Option<&'s dyn VariableHandler>,
}

impl<'s, S: PropertySource + ?Sized> Expander<'s, S> {
    /// Creates an expander without a fallback resolver
    pub fn new(source: &'s S, config: &'s ExpansionConfig) -> Self {
        Self {
            source,
            config,
            resolver: None,
        }
    }

    /// Sets the resolver consulted for keys missing from the source
    pub fn with_resolver(mut self, resolver: Option<&'s dyn VariableHandler>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Expands every placeholder in `input`.
    ///
    /// Each call starts with a fresh [`ExpansionContext`].
    pub fn expand(&self, input: &str) -> Result<String, ExpandError> {
        let mut context = ExpansionContext::new();
        self.expand_with_context(input, &mut context)
    }

    /// Substitutes the leftmost placeholder and rescans the whole result
    /// until no prefix is left.
    ///
    /// Resolved text is spliced in before the next scan, so placeholders it
    /// contains, or forms together with the text around it, are expanded too.
    pub fn expand_with_context(
        &self,
        input: &str,
        context: &mut ExpansionContext,
    ) -> Result<String, ExpandError> {
        if !self.config.is_enabled() {
            return Ok(input.to_string());
        }
        let prefix = self.config.prefix.as_str();
        let postfix = self.config.postfix.as_str();
        let mut text = input.to_string();

        while let Some(start) = text.find(prefix) {
            let key_start = start + prefix.len();
            let Some(key_len) = text[key_start..].find(postfix) else {
                return Err(ExpandError::MalformedExpression {
                    expression: text[start..].to_string(),
                    property: None,
                });
            };
            let key_end = key_start + key_len;
            let key = text[key_start..key_end].to_string();

            context.mark_seen(&key)?;
            let resolved = self.resolve(&key, context);
            text.replace_range(start..key_end + postfix.len(), &resolved);
        }

        Ok(text)
    }

    /// Looks a key up in the source, then in the resolver, then defaults to empty
    fn resolve(&self, key: &str, context: &ExpansionContext) -> String {
        if let Some(value) = self.source.raw_value(key) {
            trace!(key, seen = context.seen_count(), "resolved from properties");
            return value.to_string();
        }
        if let Some(value) = self
            .resolver
            .and_then(|resolver| resolver.resolve_variable_with_context(key, context))
        {
            trace!(key, seen = context.seen_count(), "resolved from fallback");
            return value;
        }
        warn!(key, "unresolved placeholder expands to empty string");
        String::new()
    }
}

/// Expands `input` against `source` with the given configuration and fallback resolver
pub fn expand<S: PropertySource + ?Sized>(
    input: &str,
    source: &S,
    config: &ExpansionConfig,
    resolver: Option<&dyn VariableHandler>,
) -> Result<String, ExpandError> {
    Expander::new(source, config)
        .with_resolver(resolver)
        .expand(input)
}
