//! Decoding of base64-encoded JSON payload fields (`cx`, `ue_px`).
//!
//! The tracker encodes self-describing JSON with URL-safe base64 and strips
//! the padding. Decoding is bit-exact: the standard and URL-safe alphabets
//! are both accepted, padding is optional, and anything else (including
//! whitespace) is an error.

use std::borrow::Cow;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};

/// Query parameter carrying the encoded context array.
pub const CONTEXTS_PARAM: &str = "cx";

/// Query parameter carrying the encoded unstructured event.
pub const UNSTRUCT_EVENT_PARAM: &str = "ue_px";

/// Well-known Iglu schema identifiers used in assertions.
///
/// These are opaque tokens; they are only ever compared for exact equality.
pub mod schemas {
    /// Envelope around the context array in `cx`.
    pub const CONTEXTS: &str = "iglu:com.snowplowanalytics.snowplow/contexts/jsonschema/1-0-0";
    /// Envelope around the event in `ue_px`.
    pub const UNSTRUCT_EVENT: &str =
        "iglu:com.snowplowanalytics.snowplow/unstruct_event/jsonschema/1-0-0";
    /// Per-page-view context carrying the page view `id`.
    pub const WEB_PAGE: &str = "iglu:com.snowplowanalytics.snowplow/web_page/jsonschema/1-0-0";
    /// Consent / basis-for-processing context.
    pub const GDPR: &str = "iglu:com.snowplowanalytics.snowplow/gdpr/jsonschema/1-0-0";
    pub const MOBILE_CONTEXT: &str =
        "iglu:com.snowplowanalytics.snowplow/mobile_context/jsonschema/1-0-1";
    pub const GEOLOCATION_CONTEXT: &str =
        "iglu:com.snowplowanalytics.snowplow/geolocation_context/jsonschema/1-1-0";
    pub const APPLICATION_ERROR: &str =
        "iglu:com.snowplowanalytics.snowplow/application_error/jsonschema/1-0-1";
}

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A schema-tagged JSON value (`{ "schema": ..., "data": ... }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribing {
    /// Opaque schema identifier.
    pub schema: String,
    /// Payload described by `schema`.
    pub data: Value,
}

impl SelfDescribing {
    /// Build a self-describing value.
    #[must_use]
    pub fn new(schema: impl Into<String>, data: Value) -> Self {
        Self {
            schema: schema.into(),
            data,
        }
    }

    /// Read a top-level field of `data`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Decode a transport-encoded field into a JSON value.
///
/// # Errors
/// Returns [`DecodeError`] if the input is not base64, not UTF-8, or not JSON.
pub fn decode(encoded: &str) -> DecodeResult<Value> {
    let normalized: Cow<'_, str> = if encoded.contains(['+', '/']) {
        Cow::Owned(encoded.replace('+', "-").replace('/', "_"))
    } else {
        Cow::Borrowed(encoded)
    };
    let bytes = PAYLOAD_ENGINE.decode(normalized.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

/// Encode a JSON value the way the tracker does (URL-safe, unpadded).
#[must_use]
pub fn encode(value: &Value) -> String {
    PAYLOAD_ENGINE.encode(value.to_string())
}

/// Decode a `cx` field into its ordered list of contexts.
///
/// # Errors
/// Returns [`DecodeError`] on transport errors or if the envelope's `data`
/// is not an array of self-describing objects.
pub fn decode_contexts(encoded: &str) -> DecodeResult<Vec<SelfDescribing>> {
    let envelope = decode_envelope(encoded)?;
    let Value::Array(items) = envelope.data else {
        return Err(DecodeError::Shape("context envelope data is not an array".into()));
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|err| DecodeError::Shape(format!("invalid context entry: {err}")))
        })
        .collect()
}

/// Decode a `ue_px` field into the wrapped event.
///
/// # Errors
/// Returns [`DecodeError`] on transport errors or if the envelope's `data`
/// is not a self-describing object.
pub fn decode_unstruct_event(encoded: &str) -> DecodeResult<SelfDescribing> {
    let envelope = decode_envelope(encoded)?;
    serde_json::from_value(envelope.data)
        .map_err(|err| DecodeError::Shape(format!("invalid event wrapper: {err}")))
}

fn decode_envelope(encoded: &str) -> DecodeResult<SelfDescribing> {
    let value = decode(encoded)?;
    serde_json::from_value(value)
        .map_err(|err| DecodeError::Shape(format!("invalid envelope: {err}")))
}
