//! Tagged value model for decoded analysis records.
//!
//! This module defines the core data model used to represent decoded and
//! normalized model responses. Values carry their shape explicitly, so the
//! normalization rules become exhaustive pattern matches instead of runtime
//! type sniffing. The types round-trip through JSON with [`serde`].

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar field or cell value: free text, integer, or float.
///
/// Serialized untagged, so `42` stays a JSON number and `"42a"` stays a
/// JSON string.
///
/// # Examples
///
/// ```
/// use toon_report_core::Scalar;
///
/// let n = Scalar::Int(42);
/// assert_eq!(n.as_int(), Some(42));
/// assert_eq!(n.as_float(), Some(42.0));
///
/// let t = Scalar::text("parcialmente_conforme");
/// assert_eq!(t.as_str(), Some("parcialmente_conforme"));
/// assert_eq!(t.as_int(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Free text (possibly empty).
    Text(String),
}

impl Scalar {
    /// Creates a text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the text content, if this is a text scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer scalar.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric content, widening integers to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// Returns `true` for a text scalar whose content is empty or blank.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A field value in one of the four shapes the format produces.
///
/// The decoder only ever emits [`Value::Scalar`] and [`Value::ObjectArray`]
/// (a table section is shape-ambiguous until domain knowledge is applied);
/// [`Value::Object`] and [`Value::ScalarArray`] are produced by
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single scalar.
    Scalar(Scalar),
    /// An ordered sequence of bare scalars.
    ScalarArray(Vec<Scalar>),
    /// A single nested record.
    Object(Record),
    /// An ordered sequence of records.
    ObjectArray(Vec<Record>),
}

impl Value {
    /// Returns the scalar content, if this is a scalar value.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Returns the nested record, if this is an object value.
    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Self::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the row sequence, if this is an array of records.
    pub fn as_object_array(&self) -> Option<&[Record]> {
        match self {
            Self::ObjectArray(rows) => Some(rows),
            _ => None,
        }
    }

    /// Returns the scalar sequence, if this is an array of scalars.
    pub fn as_scalar_array(&self) -> Option<&[Scalar]> {
        match self {
            Self::ScalarArray(items) => Some(items),
            _ => None,
        }
    }

    /// Human-readable shape label used in diagnostics and violations.
    pub fn shape_label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::ScalarArray(_) => "array-of-scalar",
            Self::Object(_) => "object",
            Self::ObjectArray(_) => "array-of-object",
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

/// An insertion-ordered mapping from field names to values.
///
/// Key order is preserved so that re-serialized records keep the field and
/// column order of the source text. Key sets are small (a dozen entries at
/// most), so lookups are linear scans.
///
/// # Examples
///
/// ```
/// use toon_report_core::{Record, Scalar, Value};
///
/// let mut record = Record::new();
/// record.insert("percentual_conclusao".into(), Value::Scalar(Scalar::Int(72)));
/// record.insert("analise_progresso".into(), Value::Scalar(Scalar::text("Fase intermediária")));
///
/// assert_eq!(record.len(), 2);
/// assert_eq!(
///     record.get("percentual_conclusao").and_then(|v| v.as_scalar()).and_then(|s| s.as_int()),
///     Some(72),
/// );
///
/// let json = serde_json::to_string(&record).unwrap();
/// assert_eq!(json, r#"{"percentual_conclusao":72,"analise_progresso":"Fase intermediária"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Inserts a value, replacing in place when the key already exists.
    pub fn insert(&mut self, key: String, value: Value) {
        if let Some(existing) = self.get_mut(&key) {
            *existing = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Removes and returns the value for `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Returns `true` when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
