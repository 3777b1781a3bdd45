use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOperator {
    Equals,
    Disequals,
    Like,
    Greater,
    GreaterOrEquals,
    Lower,
    LowerOrEquals,
}

impl SearchOperator {
    pub fn as_wire(&self) -> &'static str {
        match self {
            SearchOperator::Equals => "=",
            SearchOperator::Disequals => "!=",
            SearchOperator::Like => "LIKE",
            SearchOperator::Greater => ">",
            SearchOperator::GreaterOrEquals => ">=",
            SearchOperator::Lower => "<",
            SearchOperator::LowerOrEquals => "<=",
        }
    }
}

// Custom data predicate for match and user searches
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCustomData {
    pub key: String,
    pub op: SearchOperator,
    pub value: String,
}

impl SearchCustomData {
    pub fn new(key: impl Into<String>, op: SearchOperator, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }
}

/// Encodes predicates for the `CustomData` form field. Empty keys are
/// skipped and an empty filter encodes as an empty string.
pub fn encode_filters(filters: &[SearchCustomData]) -> String {
    let list: Vec<Value> = filters
        .iter()
        .filter(|f| !f.key.is_empty())
        .map(|f| {
            json!({
                "key": f.key,
                "value": f.value,
                "operator": f.op.as_wire(),
            })
        })
        .collect();

    if list.is_empty() {
        String::new()
    } else {
        Value::Array(list).to_string()
    }
}
