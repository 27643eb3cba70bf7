//! Whole-log checks built on top of entry decoding.

use serde_json::Value;

use crate::context::find_by_schema;
use crate::equality::json_eq;
use crate::log::LogEntry;
use crate::payload::schemas;

/// Page-view event kind.
pub const PAGE_VIEW: &str = "pv";

/// Requires a per-page identifier to change between page views.
///
/// Entries of `event_kind` are decoded, the first context with
/// `context_schema` is located, and its `id_field` is extracted. The check
/// passes when at least two distinct identifiers were seen. Entries whose
/// identifier cannot be extracted contribute nothing.
#[derive(Debug, Clone)]
pub struct DistinctIdCheck {
    /// Event kind (`e` value) of the entries to inspect.
    pub event_kind: String,
    /// Schema of the context carrying the identifier.
    pub context_schema: String,
    /// Data field holding the identifier.
    pub id_field: String,
}

impl Default for DistinctIdCheck {
    fn default() -> Self {
        Self {
            event_kind: PAGE_VIEW.to_string(),
            context_schema: schemas::WEB_PAGE.to_string(),
            id_field: "id".to_string(),
        }
    }
}

impl DistinctIdCheck {
    /// Identifiers extracted from matching entries, in log order.
    #[must_use]
    pub fn identifiers(&self, log: &[LogEntry]) -> Vec<Value> {
        log.iter()
            .filter(|entry| entry.event_kind() == Some(self.event_kind.as_str()))
            .filter_map(|entry| {
                let contexts = match entry.contexts() {
                    Ok(contexts) => contexts,
                    Err(err) => {
                        tracing::debug!(error = %err, "skipping entry without decodable contexts");
                        return None;
                    }
                };
                find_by_schema(&contexts, &self.context_schema)
                    .and_then(|ctx| ctx.field(&self.id_field))
                    .cloned()
            })
            .collect()
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn distinct_count(&self, log: &[LogEntry]) -> usize {
        let mut distinct: Vec<Value> = Vec::new();
        for id in self.identifiers(log) {
            if !distinct.iter().any(|seen| json_eq(seen, &id)) {
                distinct.push(id);
            }
        }
        distinct.len()
    }

    #[must_use]
    pub fn evaluate(&self, log: &[LogEntry]) -> bool {
        self.distinct_count(log) >= 2
    }
}

/// Requires every entry of the log to carry a context with `schema`.
#[derive(Debug, Clone)]
pub struct ContextCoverageCheck {
    /// Schema every entry must carry a context for.
    pub schema: String,
}

impl Default for ContextCoverageCheck {
    fn default() -> Self {
        Self {
            schema: schemas::GDPR.to_string(),
        }
    }
}

impl ContextCoverageCheck {
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }

    /// Indices of entries lacking the context, in log order.
    ///
    /// Entries without a decodable `cx` count as lacking it.
    #[must_use]
    pub fn uncovered(&self, log: &[LogEntry]) -> Vec<usize> {
        log.iter()
            .enumerate()
            .filter(|(_, entry)| {
                !entry
                    .contexts()
                    .is_ok_and(|contexts| find_by_schema(&contexts, &self.schema).is_some())
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// True when no entry lacks the context. An empty log passes.
    #[must_use]
    pub fn evaluate(&self, log: &[LogEntry]) -> bool {
        self.uncovered(log).is_empty()
    }
}

/// Page views carry at least two distinct web page ids.
#[must_use]
pub fn page_views_have_distinct_ids(log: &[LogEntry]) -> bool {
    DistinctIdCheck::default().evaluate(log)
}

/// Every captured request carries a GDPR context.
#[must_use]
pub fn all_events_have_gdpr_context(log: &[LogEntry]) -> bool {
    ContextCoverageCheck::default().evaluate(log)
}
