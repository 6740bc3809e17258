//! Backend wire format.
//!
//! The backend wraps every payload in `{ data, message?, error? }` and is not
//! consistent about field names: ids come as `id`, `_id`, `col_id`, `cid` or
//! `folder_id`, titles as `title` or `name`, and ids or status codes may be
//! numbers or strings. All of that is normalized here and nowhere else.

use std::collections::BTreeMap;

use courier_application::ports::{CollectionRecord, EnvironmentRecord, FolderRecord};
use courier_domain::response::pretty_json;
use courier_domain::{SavedRequest, Variable, generate_id};
use serde_json::Value;

/// Id fields of a created or listed collection.
pub const COLLECTION_ID_KEYS: &[&str] = &["id", "col_id", "cid"];
/// Id fields of a created folder.
pub const FOLDER_ID_KEYS: &[&str] = &["id", "_id", "folder_id"];
/// Id fields of everything else.
pub const RECORD_ID_KEYS: &[&str] = &["id", "_id"];

/// Title used for environments listed without one.
pub const DEFAULT_ENVIRONMENT_TITLE: &str = "Env";

/// Returns the first non-empty id among `keys`.
#[must_use]
pub fn extract_id(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find_map(scalar_text)
}

/// Returns the `data` member of a response body.
#[must_use]
pub fn data(body: &Value) -> Option<&Value> {
    body.get("data").filter(|d| !d.is_null())
}

/// Returns the `data` array of a response body, or nothing.
#[must_use]
pub fn data_list(body: &Value) -> &[Value] {
    data(body)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Returns the id the backend assigned to a created item.
#[must_use]
pub fn created_id(body: &Value, keys: &[&str]) -> Option<String> {
    data(body).and_then(|d| extract_id(d, keys))
}

/// Returns the `message` or `error` text of an error body.
#[must_use]
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key))
        .find_map(scalar_text)
}

/// Normalizes a listed collection. Entries without an id are skipped.
#[must_use]
pub fn collection_record(value: &Value) -> Option<CollectionRecord> {
    Some(CollectionRecord {
        id: extract_id(value, COLLECTION_ID_KEYS)?,
        title: first_text(value, &["title", "name"]).unwrap_or_default(),
        description: text(value, "description"),
    })
}

/// Normalizes a listed folder. A folder without an id gets a local one.
#[must_use]
pub fn folder_record(value: &Value) -> FolderRecord {
    FolderRecord {
        id: extract_id(value, RECORD_ID_KEYS).unwrap_or_else(generate_id),
        name: text(value, "name"),
        description: text(value, "description"),
    }
}

/// Normalizes a listed environment. Entries without an id are skipped.
#[must_use]
pub fn environment_record(value: &Value) -> Option<EnvironmentRecord> {
    Some(EnvironmentRecord {
        id: extract_id(value, RECORD_ID_KEYS)?,
        title: first_text(value, &["title", "name"])
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT_TITLE.to_string()),
    })
}

/// Normalizes a variable. Entries without an id are skipped.
#[must_use]
pub fn variable(value: &Value) -> Option<Variable> {
    Some(Variable::new(
        extract_id(value, RECORD_ID_KEYS)?,
        text(value, "key"),
        text(value, "value"),
    ))
}

/// Normalizes a listed saved request. Entries without an id are skipped.
///
/// Non-string bodies and responses are pretty-printed, header values are
/// turned into text and the method is upper-cased.
#[must_use]
pub fn saved_request(value: &Value) -> Option<SavedRequest> {
    extract_id(value, RECORD_ID_KEYS).map(|id| saved_fields(value, id))
}

/// Normalizes a saved request fetched by id; the record may omit its id.
#[must_use]
pub fn fetched_request(value: &Value, id: &str) -> SavedRequest {
    let id = extract_id(value, RECORD_ID_KEYS).unwrap_or_else(|| id.to_string());
    saved_fields(value, id)
}

fn saved_fields(value: &Value, id: String) -> SavedRequest {
    SavedRequest {
        id,
        method: text(value, "method").to_uppercase(),
        url: text(value, "url"),
        headers: value.get("headers").and_then(Value::as_object).map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), scalar_text(v).unwrap_or_default()))
                .collect::<BTreeMap<_, _>>()
        }),
        body: value.get("body").and_then(document_text),
        response: value.get("response").and_then(document_text),
        status: value.get("res_statuscode").and_then(status_code),
        status_text: value.get("statusmessage").and_then(scalar_text),
        folder_id: value.get("folder_id").and_then(scalar_text),
        collection_id: value.get("collection_id").and_then(scalar_text),
    }
}

fn text(value: &Value, key: &str) -> String {
    value.get(key).and_then(scalar_text).unwrap_or_default()
}

fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn document_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(pretty_json(other)),
    }
}

fn status_code(value: &Value) -> Option<u16> {
    let code: Option<u16> = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    code.filter(|code| *code != 0)
}
