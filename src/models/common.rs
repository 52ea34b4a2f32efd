//! Common types shared across RT API models.
//!
//! RT REST 2.0 returns most relations as reference objects
//! (`{"type": "queue", "id": "3", "_url": "..."}`) but some fields arrive as
//! bare identifiers. The types here absorb that variance at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reference to another RT record, as it may appear on the wire.
///
/// Queue, owner and creator fields can come back as a bare numeric id, a
/// bare name, or a reference object. All three collapse to one display
/// identifier through [`RtRef::display_id`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RtRef {
    /// A bare numeric identifier.
    Id(u64),
    /// A bare name or string identifier.
    Name(String),
    /// A reference object.
    Object {
        /// Identifier, string or number.
        #[serde(default)]
        id: Option<Value>,
        /// Display name, when RT includes one.
        #[serde(default, alias = "Name")]
        name: Option<String>,
    },
}

impl RtRef {
    /// Returns the identifier to show to callers.
    ///
    /// Prefers a non-empty, non-zero id and falls back to the name.
    pub fn display_id(&self) -> Option<String> {
        match self {
            RtRef::Id(id) => Some(id.to_string()),
            RtRef::Name(name) => Some(name.clone()),
            RtRef::Object { id, name } => id
                .as_ref()
                .and_then(truthy_scalar)
                .or_else(|| name.clone()),
        }
    }
}

/// Renders a JSON scalar as a string, treating `""`, `0`, `false` and `null` as absent.
fn truthy_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalizes an optional reference to its display identifier.
pub fn ref_id(value: &Option<RtRef>) -> Option<String> {
    value.as_ref().and_then(RtRef::display_id)
}

/// Normalizes a list of references, dropping entries without an identifier.
pub fn ref_ids(values: &[RtRef]) -> Vec<String> {
    values.iter().filter_map(RtRef::display_id).collect()
}

/// A paged collection as returned by RT list and search endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct RtCollection<T> {
    /// Total number of matching records.
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub total: Option<u64>,

    /// Number of records in this page.
    #[serde(default, deserialize_with = "deserialize_optional_u64")]
    pub count: Option<u64>,

    /// The records in this page.
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
}

impl<T> RtCollection<T> {
    /// Total matching records, `0` when RT omitted it.
    pub fn total(&self) -> u64 {
        self.total.unwrap_or(0)
    }

    /// Records in this page, `0` when RT omitted it.
    pub fn count(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

/// One entry of an RT `_hyperlinks` array.
#[derive(Debug, Clone, Deserialize)]
pub struct Hyperlink {
    /// Relationship name, e.g. `depends-on` or `attachment`.
    #[serde(rename = "ref", default)]
    pub relation: Option<String>,

    /// Record type of the target.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Identifier of the target.
    #[serde(default, deserialize_with = "deserialize_optional_string_or_int")]
    pub id: Option<String>,

    /// REST URL of the target.
    #[serde(rename = "_url", default)]
    pub url: Option<String>,
}

/// A reference to a related record, as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRef {
    /// Identifier of the target record.
    pub id: Option<String>,

    /// Record type of the target (`ticket`, `attachment`, ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// REST URL of the target.
    pub url: Option<String>,
}

impl From<&Hyperlink> for LinkRef {
    fn from(link: &Hyperlink) -> Self {
        Self {
            id: link.id.clone(),
            kind: link.kind.clone(),
            url: link.url.clone(),
        }
    }
}

/// Deserializes a field whose `null` should mean "empty".
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes a string field that RT sometimes sends as a number.
pub fn deserialize_optional_string_or_int<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Deserializes a count or size that RT may send as a string or a number.
///
/// Unparseable values become `None` rather than failing the whole record.
pub fn deserialize_optional_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
