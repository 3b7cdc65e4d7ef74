//! Document normalization
//!
//! Converts BSON documents read from the store into plain JSON trees that
//! only contain strings, numbers, booleans, null, arrays and objects.
//! Object identifiers become their 24-character hex form wherever they
//! appear, so responses never leak extended-JSON wrappers such as
//! `{"$oid": ...}` to the storefront.

use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value as JsonValue};

/// Normalize a whole document.
///
/// The input is borrowed and never modified; a fresh tree is returned.
pub fn normalize_document(doc: &Document) -> JsonValue {
    let mut object = Map::new();
    for (key, value) in doc {
        object.insert(key.clone(), normalize(value));
    }
    JsonValue::Object(object)
}

/// Normalize a single BSON value, recursing into nested documents and arrays.
pub fn normalize(value: &Bson) -> JsonValue {
    match value {
        Bson::Null | Bson::Undefined => JsonValue::Null,
        Bson::ObjectId(oid) => JsonValue::String(oid.to_hex()),
        Bson::Document(doc) => normalize_document(doc),
        Bson::Array(items) => JsonValue::Array(items.iter().map(normalize).collect()),
        Bson::String(s) => JsonValue::String(s.clone()),
        Bson::Boolean(b) => JsonValue::Bool(*b),
        Bson::Int32(n) => JsonValue::from(*n),
        Bson::Int64(n) => JsonValue::from(*n),
        Bson::Double(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Bson::DateTime(dt) => {
            JsonValue::String(dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        other => other.clone().into_relaxed_extjson(),
    }
}
