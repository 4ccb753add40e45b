//! Line-level schema for a post, plus the truthiness rules that decide
//! whether a field counts as present.

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

/// Fields the aggregation reads from each post. Extra fields are ignored by serde.
/// Values are kept raw so that ids may be strings or numbers and so that
/// `null`/empty values can be told apart from malformed ones.
#[derive(Debug, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub author_id: Option<Value>,
    #[serde(default)]
    pub lang: Option<Value>,
}

/// Decode one JSON line. Fails on invalid JSON and on JSON that is not an object.
pub fn parse_record(line: &str) -> serde_json::Result<PostRecord> {
    let val: Value = serde_json::from_str(line)?;
    if !val.is_object() {
        return Err(serde_json::Error::custom("expected a JSON object"));
    }
    PostRecord::deserialize(val)
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` count as absent.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a truthy string or number as a key. Numbers keep their JSON text.
pub fn as_key(v: &Value) -> Option<String> {
    if !is_truthy(v) {
        return None;
    }
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl PostRecord {
    pub fn id_key(&self) -> Option<String> {
        self.id.as_ref().and_then(as_key)
    }

    pub fn author_key(&self) -> Option<String> {
        self.author_id.as_ref().and_then(as_key)
    }

    pub fn lang_key(&self) -> Option<String> {
        self.lang.as_ref().and_then(as_key)
    }

    /// `true` when `created_at` is set to something other than a falsy value.
    pub fn has_created_at(&self) -> bool {
        self.created_at.as_ref().is_some_and(is_truthy)
    }

    pub fn created_at_str(&self) -> Option<&str> {
        self.created_at.as_ref().and_then(|v| v.as_str())
    }
}
