//! Captured request log.
//!
//! [`RequestLog`] is a cheaply cloneable handle over one ordered, append-only
//! sequence of [`LogEntry`] values. The collector holds one clone and is the
//! only writer; assertions read through [`RequestLog::snapshot`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::error::{DecodeError, DecodeResult};
use crate::payload::{self, CONTEXTS_PARAM, SelfDescribing, UNSTRUCT_EVENT_PARAM};

/// Query parameters of one captured request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(BTreeMap<String, String>);

impl LogEntry {
    /// Create an empty entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Event kind (`e` parameter), e.g. `pv`, `se`, `ue`.
    #[must_use]
    pub fn event_kind(&self) -> Option<&str> {
        self.get("e")
    }

    /// Decode the `cx` parameter into its contexts.
    ///
    /// # Errors
    /// Returns [`DecodeError::MissingField`] if the entry has no `cx`, or any
    /// error from [`payload::decode_contexts`].
    pub fn contexts(&self) -> DecodeResult<Vec<SelfDescribing>> {
        let raw = self
            .get(CONTEXTS_PARAM)
            .ok_or_else(|| DecodeError::MissingField(CONTEXTS_PARAM.to_string()))?;
        payload::decode_contexts(raw)
    }

    /// Decode the `ue_px` parameter into the wrapped event.
    ///
    /// # Errors
    /// Returns [`DecodeError::MissingField`] if the entry has no `ue_px`, or
    /// any error from [`payload::decode_unstruct_event`].
    pub fn unstruct_event(&self) -> DecodeResult<SelfDescribing> {
        let raw = self
            .get(UNSTRUCT_EVENT_PARAM)
            .ok_or_else(|| DecodeError::MissingField(UNSTRUCT_EVENT_PARAM.to_string()))?;
        payload::decode_unstruct_event(raw)
    }

    /// Serialize as a single JSON object.
    ///
    /// # Errors
    /// Returns an error if `serde_json` rejects the entry.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Render entries as one JSON object per line.
#[must_use]
pub fn json_lines(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .filter_map(|entry| match entry.to_json() {
            Ok(line) => Some(line),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unserializable log entry");
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LogEntry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Default)]
struct LogInner {
    entries: Mutex<Vec<LogEntry>>,
    appended: Notify,
}

/// Ordered, append-only store of captured requests.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    inner: Arc<LogInner>,
}

impl RequestLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end. Never rejects.
    pub fn append(&self, entry: LogEntry) {
        let len = {
            let mut entries = self.inner.entries.lock();
            entries.push(entry);
            entries.len()
        };
        tracing::trace!(entries = len, "request log append");
        self.inner.appended.notify_waiters();
    }

    /// Copy of all entries in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.inner.entries.lock().clone()
    }

    /// Take every entry out in one step, leaving the log empty.
    ///
    /// Appends racing with the call land either in the returned entries or in
    /// the emptied log, never in neither.
    #[must_use]
    pub fn drain(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.inner.entries.lock())
    }

    /// Remove every entry, returning how many were dropped.
    pub fn clear(&self) -> usize {
        self.drain().len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until the log holds at least `count` entries.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for_len(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.inner.appended.notified();
            if self.len() >= count {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.len() >= count;
            }
        }
    }

    /// Render every entry as one JSON object per line.
    #[must_use]
    pub fn to_json_lines(&self) -> String {
        json_lines(&self.inner.entries.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{encode, schemas};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pv(page: &str) -> LogEntry {
        LogEntry::new().with("e", "pv").with("page", page)
    }

    #[test]
    fn append_preserves_insertion_order() {
        let log = RequestLog::new();
        log.append(pv("a"));
        log.append(pv("b"));
        log.append(pv("a"));

        let pages: Vec<_> = log
            .snapshot()
            .iter()
            .map(|e| e.get("page").unwrap().to_string())
            .collect();
        assert_eq!(pages, vec!["a", "b", "a"]);
    }

    #[test]
    fn append_accepts_empty_entry() {
        let log = RequestLog::new();
        log.append(LogEntry::new());
        assert_eq!(log.len(), 1);
        assert!(log.snapshot()[0].is_empty());
    }

    #[test]
    fn clones_share_one_log() {
        let log = RequestLog::new();
        let writer = log.clone();
        writer.append(pv("x"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn clear_empties_log() {
        let log = RequestLog::new();
        log.append(pv("a"));
        log.append(pv("b"));
        assert_eq!(log.clear(), 2);
        assert!(log.is_empty());
        assert!(log.snapshot().is_empty());
        assert_eq!(log.clear(), 0);
    }

    #[test]
    fn drain_returns_entries_and_empties_log() {
        let log = RequestLog::new();
        log.append(pv("a"));
        log.append(pv("b"));
        assert_eq!(log.drain(), vec![pv("a"), pv("b")]);
        assert!(log.is_empty());
        assert!(log.drain().is_empty());
    }

    #[test]
    fn drain_under_concurrent_appends_loses_nothing() {
        let log = RequestLog::new();
        let writer = log.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..1_000 {
                writer.append(pv(&i.to_string()));
            }
        });

        let mut drained = Vec::new();
        while !handle.is_finished() {
            drained.extend(log.drain());
        }
        handle.join().unwrap();
        drained.extend(log.drain());

        let pages: Vec<_> = drained
            .iter()
            .map(|e| e.get("page").unwrap().to_string())
            .collect();
        let expected: Vec<_> = (0..1_000).map(|i| i.to_string()).collect();
        assert_eq!(pages, expected);
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let log = RequestLog::new();
        log.append(pv("a"));
        let snapshot = log.snapshot();
        log.append(pv("b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn to_json_lines_renders_each_entry() {
        let log = RequestLog::new();
        log.append(LogEntry::new().with("e", "pv"));
        log.append(LogEntry::new().with("e", "se").with("se_ca", "Mixes"));
        assert_eq!(
            log.to_json_lines(),
            "{\"e\":\"pv\"}\n{\"e\":\"se\",\"se_ca\":\"Mixes\"}"
        );
    }

    #[test]
    fn json_lines_matches_entry_json() {
        let entries = vec![pv("a"), LogEntry::new()];
        assert_eq!(entries[0].to_json().unwrap(), "{\"e\":\"pv\",\"page\":\"a\"}");
        assert_eq!(json_lines(&entries), "{\"e\":\"pv\",\"page\":\"a\"}\n{}");
        assert_eq!(json_lines(&[]), "");
    }

    #[test]
    fn entry_from_pairs() {
        let entry: LogEntry = [("e", "pv"), ("aid", "CFe23a")].into_iter().collect();
        assert_eq!(entry.len(), 2);
        assert_eq!(entry.event_kind(), Some("pv"));
        assert_eq!(entry.get("aid"), Some("CFe23a"));
        assert!(entry.contains_key("aid"));
        assert!(!entry.contains_key("uid"));
    }

    #[test]
    fn entry_contexts_missing_field() {
        let entry = pv("a");
        assert!(matches!(
            entry.contexts(),
            Err(DecodeError::MissingField(field)) if field == "cx"
        ));
        assert!(matches!(
            entry.unstruct_event(),
            Err(DecodeError::MissingField(field)) if field == "ue_px"
        ));
    }

    #[test]
    fn entry_contexts_decodes() {
        let cx = encode(&json!({
            "schema": schemas::CONTEXTS,
            "data": [{"schema": schemas::WEB_PAGE, "data": {"id": "id-1"}}]
        }));
        let entry = pv("a").with("cx", cx);
        let contexts = entry.contexts().unwrap();
        assert_eq!(contexts[0].field("id"), Some(&json!("id-1")));
    }

    #[tokio::test]
    async fn wait_for_len_returns_immediately_when_satisfied() {
        let log = RequestLog::new();
        log.append(pv("a"));
        assert!(log.wait_for_len(1, Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn wait_for_len_observes_later_appends() {
        let log = RequestLog::new();
        let writer = log.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.append(pv("a"));
            writer.append(pv("b"));
        });
        assert!(log.wait_for_len(2, Duration::from_secs(5)).await);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_len_times_out() {
        let log = RequestLog::new();
        log.append(pv("a"));
        assert!(!log.wait_for_len(3, Duration::from_secs(1)).await);
    }
}
