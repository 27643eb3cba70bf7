//! Query string decoding into a [`LogEntry`].
//!
//! Rules: pairs are separated by `&`, `+` decodes to a space, percent escapes
//! must decode to UTF-8, a key without `=` gets an empty value, and the first
//! occurrence of a repeated key wins. Incomplete escapes such as `%zz` are
//! kept literally.

use std::borrow::Cow;
use std::collections::BTreeMap;

use beacon_core::LogEntry;
use percent_encoding::percent_decode_str;

use crate::error::{CollectorError, CollectorResult};

/// Decode a raw query string (without the leading `?`).
///
/// # Errors
/// Returns `CollectorError::MalformedRequest` if a component is not UTF-8
/// after percent decoding.
pub fn parse_query(query: &str) -> CollectorResult<LogEntry> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;
        if fields.contains_key(&key) {
            tracing::debug!(%key, "ignoring repeated query parameter");
            continue;
        }
        fields.insert(key, value);
    }
    Ok(fields.into_iter().collect())
}

fn decode_component(raw: &str) -> CollectorResult<String> {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|err| CollectorError::MalformedRequest(format!("'{raw}': {err}")))
}
