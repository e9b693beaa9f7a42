//! Scalar datatypes: XML Schema primitives, enumerations and whitespace lists.

use crate::Value;
use serde::{Deserialize, Serialize};

/// The XML Schema primitive types the model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Primitive {
    String,
    AnyUri,
    Language,
    Boolean,
    Int,
    Long,
    NonNegativeInteger,
    PositiveInteger,
    Double,
}

impl Primitive {
    /// Every primitive, in the order the builtin package registers them.
    pub const ALL: [Primitive; 9] = [
        Primitive::String,
        Primitive::AnyUri,
        Primitive::Language,
        Primitive::Boolean,
        Primitive::Int,
        Primitive::Long,
        Primitive::NonNegativeInteger,
        Primitive::PositiveInteger,
        Primitive::Double,
    ];

    /// The XML Schema type name, e.g. `anyURI`.
    #[must_use]
    pub const fn xsd_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::AnyUri => "anyURI",
            Self::Language => "language",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::PositiveInteger => "positiveInteger",
            Self::Double => "double",
        }
    }

    /// String-like primitives keep their lexical form untouched.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::AnyUri | Self::Language)
    }

    /// Whether `value` lies in this primitive's value space.
    #[must_use]
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String | Self::AnyUri | Self::Language, Value::String(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Int, Value::Int(i)) => i32::try_from(*i).is_ok(),
            (Self::Long, Value::Int(_)) => true,
            (Self::NonNegativeInteger, Value::Int(i)) => *i >= 0,
            (Self::PositiveInteger, Value::Int(i)) => *i >= 1,
            (Self::Double, Value::Double(_)) => true,
            _ => false,
        }
    }
}

/// One literal of an enumeration datatype.
///
/// `literal` is the XML text (`open-closed`), `name` the constant-style
/// identifier (`OPEN_CLOSED`), `value` the ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumLiteral {
    pub value: i32,
    pub name: String,
    pub literal: String,
}

impl EnumLiteral {
    #[must_use]
    pub fn new(value: i32, name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
            literal: literal.into(),
        }
    }
}

/// The closed literal set of an enumeration datatype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    literals: Vec<EnumLiteral>,
}

impl EnumType {
    /// Builds an enumeration from XML literals; ordinals follow declaration
    /// order and constant names are derived from the literals.
    #[must_use]
    pub fn from_literals(literals: &[&str]) -> Self {
        Self {
            literals: literals
                .iter()
                .zip(0..)
                .map(|(lit, value)| EnumLiteral::new(value, constant_name(lit), *lit))
                .collect(),
        }
    }

    #[must_use]
    pub fn new(literals: Vec<EnumLiteral>) -> Self {
        Self { literals }
    }

    #[must_use]
    pub fn literals(&self) -> &[EnumLiteral] {
        &self.literals
    }

    /// Looks up by XML literal. This is the only lookup the codec uses.
    #[must_use]
    pub fn by_literal(&self, literal: &str) -> Option<&EnumLiteral> {
        self.literals.iter().find(|l| l.literal == literal)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&EnumLiteral> {
        self.literals.iter().find(|l| l.name == name)
    }

    #[must_use]
    pub fn by_value(&self, value: i32) -> Option<&EnumLiteral> {
        self.literals.iter().find(|l| l.value == value)
    }

    #[must_use]
    pub fn contains(&self, literal: &EnumLiteral) -> bool {
        self.literals.iter().any(|l| l == literal)
    }
}

/// Derives `ON_REQUEST` from `onRequest` and `OPEN_CLOSED` from `open-closed`.
fn constant_name(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 4);
    let mut prev_lower = false;
    for c in literal.chars() {
        if c == '-' || c == ' ' || c == '.' {
            out.push('_');
            prev_lower = false;
        } else if c.is_uppercase() && prev_lower {
            out.push('_');
            out.extend(c.to_uppercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            out.extend(c.to_uppercase());
        }
    }
    out
}

/// The shape of a datatype's value space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Primitive(Primitive),
    Enumeration(EnumType),
    /// Whitespace-separated list of a primitive item type.
    List(Primitive),
}

/// Restricting facets carried over from the schema.
///
/// The codec never enforces these; the validator does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    /// Regular expression the whole lexical value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum length: characters for text, items for lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Facets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.min_length.is_none() && self.max_length.is_none()
    }
}

/// A named scalar datatype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    name: String,
    kind: DataKind,
    #[serde(default, skip_serializing_if = "Facets::is_empty")]
    facets: Facets,
}

impl DataType {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
            facets: Facets::default(),
        }
    }

    /// The builtin datatype for a primitive, named after its XSD type.
    #[must_use]
    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(primitive.xsd_name(), DataKind::Primitive(primitive))
    }

    /// A named restriction of a primitive (e.g. `ServiceType` over `string`).
    #[must_use]
    pub fn restriction(name: impl Into<String>, base: Primitive) -> Self {
        Self::new(name, DataKind::Primitive(base))
    }

    /// Shorthand for an enumeration over XML literals.
    #[must_use]
    pub fn enumeration(name: impl Into<String>, literals: &[&str]) -> Self {
        Self::new(name, DataKind::Enumeration(EnumType::from_literals(literals)))
    }

    /// Shorthand for a whitespace list of a primitive.
    #[must_use]
    pub fn list(name: impl Into<String>, item: Primitive) -> Self {
        Self::new(name, DataKind::List(item))
    }

    /// Adds a pattern facet.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.facets.pattern = Some(pattern.into());
        self
    }

    /// Adds length facets.
    #[must_use]
    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.facets.min_length = min;
        self.facets.max_length = max;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &DataKind {
        &self.kind
    }

    #[must_use]
    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    /// The enumeration literal set, if this is an enumeration.
    #[must_use]
    pub fn enum_type(&self) -> Option<&EnumType> {
        match &self.kind {
            DataKind::Enumeration(e) => Some(e),
            _ => None,
        }
    }

    /// Default used by attributes of this type that declare none:
    /// the first literal of an enumeration, otherwise [`Value::Null`].
    #[must_use]
    pub fn intrinsic_default(&self) -> Value {
        match &self.kind {
            DataKind::Enumeration(e) => e
                .literals()
                .first()
                .cloned()
                .map_or(Value::Null, Value::Enum),
            _ => Value::Null,
        }
    }

    /// Whether a non-null `value` belongs to this datatype's value space.
    #[must_use]
    pub fn conforms(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (DataKind::Primitive(p), v) => p.conforms(v),
            (DataKind::Enumeration(e), Value::Enum(lit)) => e.contains(lit),
            (DataKind::List(item), Value::List(items)) => items
                .iter()
                .all(|v| item.conforms(v) && is_list_token(v)),
            _ => false,
        }
    }
}

/// List items are whitespace-separated in text, so a textual item must be
/// a single non-empty token.
fn is_list_token(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty() && !s.chars().any(|c| c.is_ascii_whitespace()),
        _ => true,
    }
}
