use owsmodel_types::{DataTypeId, FeatureId, RecordTypeId, Value};
use serde::{Deserialize, Serialize};

/// How many values a feature holds. Fixed when the record type is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Zero or one value.
    Optional,
    /// Exactly one value; absence is reported by the validator.
    Required,
    /// An ordered collection, never null.
    List,
}

/// How a feature maps onto XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XmlKind {
    Element,
    Attribute,
    /// Text content of the owning element.
    Simple,
    /// Mixed content: an ordered bag of differently-typed elements.
    Group,
}

/// XML name and namespace of a feature, for serializers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlMapping {
    pub kind: XmlKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// What a feature holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Scalar values of a datatype.
    Attribute { datatype: DataTypeId },
    /// Records of a target type. Containment references own their target.
    Reference {
        target: RecordTypeId,
        containment: bool,
    },
    /// Mixed-content entries, see [`owsmodel_types::FeatureEntry`].
    Group,
}

/// Describes one feature (field) of a record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub(crate) id: FeatureId,
    pub(crate) name: String,
    pub(crate) kind: FeatureKind,
    pub(crate) cardinality: Cardinality,
    pub(crate) min_occurs: usize,
    pub(crate) default: Value,
    pub(crate) unsettable: bool,
    pub(crate) derived: bool,
    pub(crate) changeable: bool,
    pub(crate) group: Option<FeatureId>,
    pub(crate) xml: XmlMapping,
    pub(crate) declared_by: RecordTypeId,
}

impl FeatureDescriptor {
    #[must_use]
    pub fn id(&self) -> FeatureId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Minimum number of values the validator requires.
    #[must_use]
    pub fn min_occurs(&self) -> usize {
        self.min_occurs
    }

    /// Value reported by `get` while the feature is unset.
    /// Many-valued features default to the empty list.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    #[must_use]
    pub fn is_many(&self) -> bool {
        self.cardinality == Cardinality::List
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.min_occurs > 0
    }

    #[must_use]
    pub fn is_unsettable(&self) -> bool {
        self.unsettable
    }

    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.derived
    }

    #[must_use]
    pub fn is_changeable(&self) -> bool {
        self.changeable
    }

    #[must_use]
    pub fn is_attribute(&self) -> bool {
        matches!(self.kind, FeatureKind::Attribute { .. })
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, FeatureKind::Reference { .. })
    }

    #[must_use]
    pub fn is_containment(&self) -> bool {
        matches!(self.kind, FeatureKind::Reference { containment: true, .. })
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, FeatureKind::Group)
    }

    #[must_use]
    pub fn datatype(&self) -> Option<DataTypeId> {
        match self.kind {
            FeatureKind::Attribute { datatype } => Some(datatype),
            _ => None,
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<RecordTypeId> {
        match self.kind {
            FeatureKind::Reference { target, .. } => Some(target),
            _ => None,
        }
    }

    /// The mixed-content group this feature is projected from, if any.
    #[must_use]
    pub fn group(&self) -> Option<FeatureId> {
        self.group
    }

    #[must_use]
    pub fn xml(&self) -> &XmlMapping {
        &self.xml
    }

    /// The record type that declares this feature (a supertype for inherited ones).
    #[must_use]
    pub fn declaring_type(&self) -> RecordTypeId {
        self.declared_by
    }
}

/// Describes one record type: its name, supertype and flattened feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub(crate) id: RecordTypeId,
    pub(crate) name: String,
    pub(crate) namespace: String,
    pub(crate) supertype: Option<RecordTypeId>,
    pub(crate) is_abstract: bool,
    pub(crate) features: Vec<FeatureDescriptor>,
    pub(crate) own_from: usize,
}

impl RecordType {
    #[must_use]
    pub fn id(&self) -> RecordTypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of the package that declares the type.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn supertype(&self) -> Option<RecordTypeId> {
        self.supertype
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// All features, supertype features first.
    #[must_use]
    pub fn features(&self) -> &[FeatureDescriptor] {
        &self.features
    }

    /// Features declared by this type itself.
    #[must_use]
    pub fn own_features(&self) -> &[FeatureDescriptor] {
        &self.features[self.own_from..]
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn feature_named(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.name == name)
    }

    /// The element features projected from `group`.
    pub fn group_members(&self, group: FeatureId) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features.iter().filter(move |f| f.group == Some(group))
    }
}
