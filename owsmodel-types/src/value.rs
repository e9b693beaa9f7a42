//! The dynamic value stored in record slots.

use crate::{EnumLiteral, FeatureId, RecordId};
use serde::{Deserialize, Serialize};

/// A value held by one feature of a record.
///
/// Scalars mirror the XML Schema value spaces the datatypes map to.
/// References (containment or not) are stored by [`RecordId`]; the record
/// itself lives in the store. Mixed-content groups hold [`FeatureEntry`]
/// values tagged with the element feature they belong to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// No value: an absent optional scalar or an empty reference slot.
    #[default]
    Null,
    Bool(bool),
    /// Every integer primitive; range is checked against the datatype.
    Int(i64),
    Double(f64),
    String(String),
    Enum(EnumLiteral),
    /// Either the items of a list datatype or a snapshot of a many-valued feature.
    List(Vec<Value>),
    Record(RecordId),
    Entry(Box<FeatureEntry>),
}

/// One element of a mixed-content group: which element feature it is, and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub feature: FeatureId,
    pub value: Value,
}

impl FeatureEntry {
    #[must_use]
    pub fn new(feature: FeatureId, value: impl Into<Value>) -> Self {
        Self {
            feature,
            value: value.into(),
        }
    }
}

impl Value {
    /// Builds a group entry value.
    #[must_use]
    pub fn entry(feature: FeatureId, value: impl Into<Value>) -> Self {
        Self::Entry(Box::new(FeatureEntry::new(feature, value)))
    }

    /// Short name of the value's variant, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Entry(_) => "entry",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumLiteral> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<RecordId> {
        match self {
            Self::Record(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entry(&self) -> Option<&FeatureEntry> {
        match self {
            Self::Entry(e) => Some(e),
            _ => None,
        }
    }

    /// Collects a list of doubles, or `None` if any item is not a double.
    #[must_use]
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_list()?.iter().map(Value::as_f64).collect()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<EnumLiteral> for Value {
    fn from(v: EnumLiteral) -> Self {
        Self::Enum(v)
    }
}

impl From<RecordId> for Value {
    fn from(v: RecordId) -> Self {
        Self::Record(v)
    }
}

impl From<FeatureEntry> for Value {
    fn from(v: FeatureEntry) -> Self {
        Self::Entry(Box::new(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::List(v.into_iter().map(Value::Double).collect())
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Self::List(v.iter().copied().map(Value::Double).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
