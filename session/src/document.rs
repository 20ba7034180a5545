//! Session document normalization.
//!
//! Stored session text comes in two shapes:
//!
//!  - the plain document, e.g. `{"foo":"bar"}`
//!  - an older double-wrapped form, `{"session":{"foo":"bar"}}`
//!
//! [`convert`] reduces both to the same canonical [`Document`], and [`render`]
//! turns a canonical document back into response bytes, optionally inside the
//! `"session"` envelope.
use serde_json::{Map, Value};

use crate::error::{SessionError, SessionResult};

/// Canonical in-memory form of a client's session. Payloads are client
/// defined, so this stays a dynamically typed JSON object.
pub type Document = Map<String, Value>;

/// Key used both by the wire envelope and by the legacy storage shape.
pub const ENVELOPE_KEY: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The document itself.
    Bare,
    /// `{"session": <document>}`
    Wrapped,
}

/// Parse stored session text into its canonical document.
///
/// Empty text is an empty document. The legacy envelope is removed only when
/// `"session"` is the sole top-level key and its value is an object.
pub fn convert(raw: &str) -> SessionResult<Document> {
    if raw.is_empty() {
        return Ok(Document::new());
    }

    let mut parsed: Document = serde_json::from_str(raw).map_err(SessionError::MalformedSession)?;

    if is_legacy_envelope(&parsed) {
        if let Some(Value::Object(inner)) = parsed.remove(ENVELOPE_KEY) {
            return Ok(inner);
        }
    }

    Ok(parsed)
}

fn is_legacy_envelope(doc: &Document) -> bool {
    doc.len() == 1 && matches!(doc.get(ENVELOPE_KEY), Some(Value::Object(_)))
}

/// Serialize a canonical document for the wire.
pub fn render(document: Document, envelope: Envelope) -> Vec<u8> {
    let value = match envelope {
        Envelope::Bare => Value::Object(document),
        Envelope::Wrapped => {
            let mut outer = Map::with_capacity(1);
            outer.insert(ENVELOPE_KEY.to_string(), Value::Object(document));
            Value::Object(outer)
        }
    };

    value.to_string().into_bytes()
}

/// [`convert`] followed by [`render`].
pub fn convert_for_wire(raw: &str, envelope: Envelope) -> SessionResult<Vec<u8>> {
    Ok(render(convert(raw)?, envelope))
}
