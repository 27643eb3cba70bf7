//! Matching of decoded self-describing contexts and events.
//!
//! A [`ContextPattern`] matches a [`SelfDescribing`] value when the schema is
//! exactly equal and every key of the pattern's data is present in the
//! value's data with a matching value. Extra data keys are ignored.

use serde_json::{Map, Value};

use crate::equality::json_is_match;
use crate::payload::SelfDescribing;

/// Schema plus partial data pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPattern {
    schema: String,
    data: Map<String, Value>,
}

impl ContextPattern {
    /// Pattern matching any data under `schema`.
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            data: Map::new(),
        }
    }

    /// Builder: require a data field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Builder: require every field of a JSON object.
    ///
    /// Non-object values are ignored.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        if let Value::Object(fields) = data {
            self.data.extend(fields);
        }
        self
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Check a single context or event.
    #[must_use]
    pub fn matches(&self, candidate: &SelfDescribing) -> bool {
        if candidate.schema != self.schema {
            return false;
        }
        let Value::Object(actual) = &candidate.data else {
            return self.data.is_empty();
        };
        self.data
            .iter()
            .all(|(key, wanted)| actual.get(key).is_some_and(|v| json_is_match(v, wanted)))
    }
}

/// Count contexts matching at least one of `patterns`.
///
/// A context matching several patterns is counted once.
#[must_use]
pub fn count_matching(contexts: &[SelfDescribing], patterns: &[ContextPattern]) -> usize {
    contexts
        .iter()
        .filter(|ctx| patterns.iter().any(|p| p.matches(ctx)))
        .count()
}

/// First context whose schema is exactly `schema`.
#[must_use]
pub fn find_by_schema<'a>(contexts: &'a [SelfDescribing], schema: &str) -> Option<&'a SelfDescribing> {
    contexts.iter().find(|ctx| ctx.schema == schema)
}
