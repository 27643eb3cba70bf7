//! Ready-made predicates for the encoded payload fields.
//!
//! These cover the recurring assertion shapes: "exactly N of these contexts
//! were attached" (N = 0 proves a context was excluded), "this context was
//! attached", and "the unstructured event is this one".

use crate::context::{ContextPattern, count_matching};
use crate::expectation::FieldMatcher;
use crate::payload::{decode_contexts, decode_unstruct_event};

/// `cx` predicate: exactly `count` contexts match any of `patterns`.
#[must_use]
pub fn contexts_matching(patterns: Vec<ContextPattern>, count: usize) -> FieldMatcher {
    FieldMatcher::try_predicate(move |raw| {
        let contexts = decode_contexts(raw)?;
        Ok(count_matching(&contexts, &patterns) == count)
    })
}

/// `cx` predicate: at least one context matches `pattern`.
#[must_use]
pub fn contexts_containing(pattern: ContextPattern) -> FieldMatcher {
    FieldMatcher::try_predicate(move |raw| {
        let contexts = decode_contexts(raw)?;
        Ok(contexts.iter().any(|ctx| pattern.matches(ctx)))
    })
}

/// `ue_px` predicate: the wrapped event matches `pattern`.
#[must_use]
pub fn unstruct_event_matching(pattern: ContextPattern) -> FieldMatcher {
    FieldMatcher::try_predicate(move |raw| Ok(pattern.matches(&decode_unstruct_event(raw)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{encode, schemas};
    use serde_json::json;

    fn cx(contexts: serde_json::Value) -> String {
        encode(&json!({"schema": schemas::CONTEXTS, "data": contexts}))
    }

    fn user_pattern() -> ContextPattern {
        ContextPattern::new("iglu:com.example_company/user/jsonschema/2-0-0")
            .with("userType", "tester")
    }

    #[test]
    fn contexts_matching_exact_count() {
        let raw = cx(json!([
            {"schema": "iglu:com.example_company/user/jsonschema/2-0-0", "data": {"userType": "tester"}},
            {"schema": schemas::WEB_PAGE, "data": {"id": "x"}}
        ]));
        assert!(contexts_matching(vec![user_pattern()], 1).matches(&raw));
        assert!(!contexts_matching(vec![user_pattern()], 2).matches(&raw));
        assert!(!contexts_matching(vec![user_pattern()], 0).matches(&raw));
    }

    #[test]
    fn contexts_matching_zero_proves_exclusion() {
        let raw = cx(json!([{"schema": schemas::WEB_PAGE, "data": {"id": "x"}}]));
        assert!(contexts_matching(vec![user_pattern()], 0).matches(&raw));
    }

    #[test]
    fn contexts_matching_zero_rejects_undecodable() {
        // A broken payload is "no match", never a vacuous zero.
        assert!(!contexts_matching(vec![user_pattern()], 0).matches("%%%"));
    }

    #[test]
    fn contexts_containing_any() {
        let raw = cx(json!([
            {"schema": schemas::WEB_PAGE, "data": {"id": "x"}},
            {"schema": "iglu:com.example_company/user/jsonschema/2-0-0", "data": {"userType": "tester", "age": 3}}
        ]));
        assert!(contexts_containing(user_pattern()).matches(&raw));
        assert!(!contexts_containing(ContextPattern::new(schemas::GDPR)).matches(&raw));
    }

    #[test]
    fn unstruct_event_matching_checks_inner_event() {
        let raw = encode(&json!({
            "schema": schemas::UNSTRUCT_EVENT,
            "data": {
                "schema": "iglu:com.acme_company/viewed_product/jsonschema/5-0-0",
                "data": {"productId": "ASO01042", "price": 10}
            }
        }));
        let wanted = ContextPattern::new("iglu:com.acme_company/viewed_product/jsonschema/5-0-0")
            .with("productId", "ASO01042");
        let other = ContextPattern::new("iglu:com.acme_company/viewed_product/jsonschema/5-0-0")
            .with("productId", "ASO01041");
        assert!(unstruct_event_matching(wanted).matches(&raw));
        assert!(!unstruct_event_matching(other).matches(&raw));
    }
}
