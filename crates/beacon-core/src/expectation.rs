//! Expectation matching over captured requests.
//!
//! An [`Expectation`] names only the parameters a test cares about. An entry
//! satisfies it when the entry carries *every* named parameter and each value
//! matches: literals by deep equality, predicates by calling them with the
//! raw parameter string. Entries missing any named parameter are skipped, so
//! a one-field expectation cannot match a request that lacks that field, and
//! unrelated fields (timestamps, random ids) never need to be spelled out.
//!
//! Non-existence is asserted with `!exists(..)`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DecodeResult;
use crate::log::LogEntry;

/// Predicate over a raw parameter value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Expected value of one parameter.
#[derive(Clone)]
pub enum FieldMatcher {
    /// Deep-equal to this JSON value.
    Literal(Value),
    /// Predicate returns true for the raw value.
    Predicate(Predicate),
}

impl FieldMatcher {
    /// Wrap a predicate closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Wrap a fallible predicate; any error counts as "does not match".
    pub fn try_predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> DecodeResult<bool> + Send + Sync + 'static,
    {
        Self::predicate(move |raw| match f(raw) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::debug!(error = %err, "predicate decode failed; treating as no match");
                false
            }
        })
    }

    /// Compare against a raw parameter value.
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            // Captured values are always strings, so only a string literal
            // can be deep-equal.
            Self::Literal(Value::String(expected)) => expected == actual,
            Self::Literal(_) => false,
            Self::Predicate(f) => f(actual),
        }
    }
}

impl fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Value> for FieldMatcher {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for FieldMatcher {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for FieldMatcher {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

/// Partial description of one expected request.
#[derive(Debug, Clone, Default)]
pub struct Expectation {
    fields: BTreeMap<String, FieldMatcher>,
}

impl Expectation {
    /// Create an empty expectation (matches any entry).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: expect a literal value.
    #[must_use]
    pub fn field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.matcher(key, FieldMatcher::Literal(value.into()))
    }

    /// Builder: expect a value accepted by `f`.
    #[must_use]
    pub fn predicate<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.matcher(key, FieldMatcher::predicate(f))
    }

    /// Builder: expect a value accepted by a fallible `f`.
    #[must_use]
    pub fn try_predicate<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> DecodeResult<bool> + Send + Sync + 'static,
    {
        self.matcher(key, FieldMatcher::try_predicate(f))
    }

    /// Builder: set any matcher, replacing an earlier one for the same key.
    #[must_use]
    pub fn matcher(mut self, key: impl Into<String>, matcher: impl Into<FieldMatcher>) -> Self {
        self.fields.insert(key.into(), matcher.into());
        self
    }

    /// Number of named parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Check a single entry.
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let projected: Vec<(&FieldMatcher, &str)> = self
            .fields
            .iter()
            .filter_map(|(key, matcher)| entry.get(key).map(|value| (matcher, value)))
            .collect();
        if projected.len() != self.fields.len() {
            return false;
        }
        projected
            .into_iter()
            .all(|(matcher, value)| matcher.matches(value))
    }
}

/// True if at least one entry of `log` satisfies `expected`.
#[must_use]
pub fn exists(expected: &Expectation, log: &[LogEntry]) -> bool {
    log.iter().any(|entry| expected.matches(entry))
}

/// Indices of every entry satisfying `expected`, in log order.
#[must_use]
pub fn find_matches(expected: &Expectation, log: &[LogEntry]) -> Vec<usize> {
    log.iter()
        .enumerate()
        .filter(|(_, entry)| expected.matches(entry))
        .map(|(idx, _)| idx)
        .collect()
}
