// services/transport.rs
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{Result, SgaError};

pub type Form = BTreeMap<String, String>;

pub const SESSION_HEADER_NAME: &str = "X-HTTP-Session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// POST when a non-empty form is attached, GET otherwise.
    Default,
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn resolve(self, form: Option<&Form>) -> Method {
        match self {
            Method::Default if form.is_some_and(|f| !f.is_empty()) => Method::Post,
            Method::Default => Method::Get,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Default => "DEFAULT",
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebRequest {
    pub method: Method,
    pub url: String,
    pub form: Option<Form>,
    pub session: Option<String>,
}

impl WebRequest {
    pub fn form_json(&self) -> String {
        serde_json::to_string(self.form.as_ref().unwrap_or(&Form::new()))
            .unwrap_or_else(|_| "{}".to_string())
    }
}

/// Sends one request to the backend. `Ok` carries the response body;
/// failures come back as [`SgaError::Transport`] with the message untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: WebRequest) -> Result<String>;
}

pub fn parse_object(body: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(SgaError::parse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Decodes a list body. An object carrying a `message` is the server
/// refusing the request and surfaces as [`SgaError::ServerRejected`].
pub fn parse_array(body: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(list) => Ok(list),
        Value::Object(map) if server_message(&map).is_some() => Err(missing_key(&map, "message")),
        other => Err(SgaError::parse(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

/// The backend's `message` field, stringified when it is not a string.
pub fn server_message(map: &Map<String, Value>) -> Option<String> {
    match map.get("message") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

/// Rejection for a well-formed body that lacks the key the caller expected.
pub fn missing_key(map: &Map<String, Value>, key: &str) -> SgaError {
    SgaError::rejected(
        server_message(map).unwrap_or_else(|| format!("API response doesn't contain '{}'", key)),
    )
}

/// Decodes an entity that must carry an `id`.
pub fn parse_entity<T: DeserializeOwned>(body: &str) -> Result<T> {
    let map = parse_object(body)?;
    if map.get("id").map_or(true, Value::is_null) {
        return Err(missing_key(&map, "id"));
    }
    Ok(serde_json::from_value(Value::Object(map))?)
}

pub fn parse_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    parse_array(body)?
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(SgaError::from))
        .collect()
}

/// Reads the `{success, message}` envelope used by the legacy endpoints.
/// Returns the message on success and rejects with it otherwise.
pub fn parse_envelope(body: &str) -> Result<Option<Value>> {
    let map = parse_object(body)?;
    let success = match map.get("success") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    };
    if success {
        Ok(map.get("message").cloned())
    } else {
        Err(SgaError::rejected(
            server_message(&map).unwrap_or_else(|| "Request was not successful".to_string()),
        ))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
