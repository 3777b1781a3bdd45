use serde_json::{Map, Value};

/// Free-form, insertion-ordered key/value bag attached to matches, actors and
/// profiles. The SDK never interprets its contents.
pub type CustomData = Map<String, Value>;

pub fn to_form_value(data: &CustomData) -> String {
    Value::Object(data.clone()).to_string()
}
