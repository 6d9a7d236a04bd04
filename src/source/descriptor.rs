// Node descriptor decoding — field-name case folding and `next` normalization.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::NO_SECRET;

/// One decoded node of the remote tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// Self-reported identifier. May be empty; never used for indexing.
    pub id: String,
    /// Self-reported depth. Only checked, never used for control flow.
    pub depth: i64,
    /// Output fragment, or [`NO_SECRET`] for interior nodes.
    pub secret: String,
    /// Diagnostic text; only legal on the first response of a crawl.
    pub message: String,
    /// Identifiers to fetch next, in listed order.
    pub next: Vec<String>,
}

impl NodeDescriptor {
    /// A node carrying anything other than the sentinel ends its branch.
    pub fn is_leaf(&self) -> bool {
        self.secret != NO_SECRET
    }

    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }

    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawDescriptor = decode_case_insensitive(body)?;
        Ok(raw.into())
    }
}

/// The `next` field arrives either as a bare string or as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NextField {
    One(String),
    Many(Vec<String>),
}

impl From<NextField> for Vec<String> {
    fn from(field: NextField) -> Self {
        match field {
            NextField::One(id) => vec![id],
            NextField::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDescriptor {
    id: Option<String>,
    depth: Option<i64>,
    secret: Option<String>,
    message: Option<String>,
    next: Option<NextField>,
}

impl From<RawDescriptor> for NodeDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            depth: raw.depth.unwrap_or_default(),
            // An absent secret means the node has nothing to report yet.
            secret: raw.secret.unwrap_or_else(|| NO_SECRET.to_string()),
            message: raw.message.unwrap_or_default(),
            next: raw.next.map(Vec::<String>::from).unwrap_or_default(),
        }
    }
}

/// Deserialize `body` after lowercasing every object key. Values are left untouched.
pub fn decode_case_insensitive<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    serde_json::from_value(lowercase_keys(value))
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}
