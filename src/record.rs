//! The structured record assembled from one document.
//!
//! A record is an ordered map from field name to value. Values are Null,
//! a single string, or a list of strings; metadata entries may also be
//! booleans. Key order is insertion order and survives serialization.

use crate::document::Document;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;

/// Ordered field-name → value mapping for one extracted item.
pub type Record = IndexMap<String, Value>;

/// Separator used when a list value has to be rendered as a single string
/// (CSV cells, validation, substring filters).
pub const LIST_SEPARATOR: &str = "; ";

/// Collapse a transformed value sequence into a record value:
/// zero entries → Null, one → String, several → Array.
pub fn collapse(values: Vec<String>) -> Value {
    match values.len() {
        0 => Value::Null,
        1 => Value::String(values.into_iter().next().unwrap_or_default()),
        _ => Value::Array(values.into_iter().map(Value::String).collect()),
    }
}

/// Render a record value as a single string. Null renders empty; lists are
/// joined with [`LIST_SEPARATOR`].
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Value::Object(_) => value.to_string(),
    }
}

/// Whether a value carries no content (Null, empty string, empty list).
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Append the mandatory metadata fields to a freshly extracted record:
/// provenance (`scraped_at`, `source_url`, `response_time`) and the GDPR
/// bookkeeping slots (`contact_by`, `user_contacted`) that a later contact
/// workflow fills in.
pub fn append_metadata(record: &mut Record, doc: &Document) {
    record.insert(
        "scraped_at".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    record.insert(
        "source_url".to_string(),
        Value::String(doc.url().to_string()),
    );
    record.insert(
        "response_time".to_string(),
        serde_json::json!(doc.response_time()),
    );
    record.insert("contact_by".to_string(), Value::Null);
    record.insert("user_contacted".to_string(), Value::Bool(false));
}
