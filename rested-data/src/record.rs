use serde_json::{Map, Value};

/// A stored or candidate record: field name to JSON value.
///
/// Values are opaque to the data layer except for the identifier field.
pub type Record = Map<String, Value>;

/// Name of the identifier field assigned by backends on insert.
pub const ID_FIELD: &str = "id";

/// Read a record's identifier as a string, if it has one.
///
/// Numeric identifiers are rendered with their JSON representation.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Interpret a JSON value as a record. Anything but an object is rejected.
pub fn into_record(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
