use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw cell value as delivered by an input adapter (spreadsheet reader,
/// AnnData reader, API request body).
///
/// Adapters are expected to have already split multivalued cells into lists;
/// the validator itself never parses delimiter conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Decimal(f64),
    List(Vec<Value>),
}

impl Value {
    /// Whether this value counts as absent: null, a whitespace-only string,
    /// or an empty list.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Integer(_) | Value::Decimal(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar rendering used for identifier lookup and error messages.
    /// Lists and nulls have no scalar rendering.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Decimal(n) => Some(n.to_string()),
            Value::Null | Value::List(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Decimal(n) => write!(f, "{n}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Decimal(n)
    }
}

/// One input row for a given entity type: a mapping from field name to raw
/// value. A missing key and an explicit null are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field value; absent fields read as [`Value::Null`].
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }

    /// Names of the fields actually present on this row, including any the
    /// schema does not define (extra spreadsheet columns are carried through
    /// so that column-key fields such as `batch_condition` can refer to them).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

/// The working set of one validation run: records grouped by entity type,
/// in the order the caller supplied them. Entry order is validation order.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    entries: Vec<(String, Vec<Record>)>,
}

impl RecordBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records for an entity type. Repeated pushes for the same type
    /// extend the existing group, keeping its original position.
    pub fn push(&mut self, entity_type: impl Into<String>, records: Vec<Record>) -> &mut Self {
        let entity_type = entity_type.into();
        if let Some((_, existing)) = self
            .entries
            .iter_mut()
            .find(|(name, _)| *name == entity_type)
        {
            existing.extend(records);
        } else {
            self.entries.push((entity_type, records));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.entries
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn records_for(&self, entity_type: &str) -> Option<&[Record]> {
        self.entries
            .iter()
            .find(|(name, _)| name == entity_type)
            .map(|(_, records)| records.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
