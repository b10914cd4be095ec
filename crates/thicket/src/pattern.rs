//! Named regular expressions for parameterized path segments.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{Result, RouterError};

/// Registry of `:name` → compiled pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: HashMap<String, Regex>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and stores a pattern, replacing any previous one for `name`.
    ///
    /// Patterns always match a whole segment: unless the caller already
    /// anchored both ends, the pattern is wrapped as `^(?:pattern)$`.
    ///
    /// # Example
    ///
    /// ```
    /// use thicket::PatternRegistry;
    ///
    /// let mut registry = PatternRegistry::new();
    /// registry.set(":id", r"\d+").unwrap();
    /// let rx = registry.get(":id").unwrap();
    /// assert!(rx.is_match("123"));
    /// assert!(!rx.is_match("a123"));
    /// ```
    pub fn set(&mut self, name: &str, pattern: &str) -> Result<()> {
        if !name.starts_with(':') {
            return Err(RouterError::InvalidPatternName(name.to_string()));
        }

        let regex = Regex::new(&anchor(pattern)).map_err(|source| RouterError::InvalidRegex {
            name: name.to_string(),
            source,
        })?;

        self.patterns.insert(name.to_string(), regex);
        Ok(())
    }

    /// Returns the compiled pattern for `name`.
    pub fn get(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Tests a candidate segment against the pattern for `name`.
    ///
    /// Unknown names never match.
    pub fn is_match(&self, name: &str, segment: &str) -> bool {
        self.get(name).is_some_and(|rx| rx.is_match(segment))
    }
}

fn anchor(pattern: &str) -> String {
    if pattern.starts_with('^') && pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("^(?:{pattern})$")
    }
}
