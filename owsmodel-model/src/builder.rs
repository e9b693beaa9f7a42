//! Declarative construction of a [`Registry`].
//!
//! Packages, record types and features are declared by name; `build`
//! assigns ids, resolves names, flattens inheritance and parses default
//! literals in one pass. Nothing about a registry can change afterwards.

use crate::registry::{Package, Registry, XSD_NS};
use crate::schema::{Cardinality, FeatureDescriptor, FeatureKind, RecordType, XmlKind, XmlMapping};
use owsmodel_types::{
    DataType, DataTypeId, FeatureId, ModelError, ModelResult, Primitive, RecordTypeId, Value,
};
use tracing::debug;

/// Declares one feature of a record type.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    name: String,
    kind: PendingKind,
    cardinality: Cardinality,
    min_occurs: Option<usize>,
    default: Option<String>,
    unsettable: bool,
    derived: bool,
    changeable: bool,
    group: Option<String>,
    xml_kind: XmlKind,
    xml_name: Option<String>,
    namespace: Option<String>,
}

#[derive(Debug, Clone)]
enum PendingKind {
    Attribute(String),
    Reference { target: String, containment: bool },
    Group,
}

impl FeatureBuilder {
    fn new(name: &str, kind: PendingKind, xml_kind: XmlKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            cardinality: Cardinality::Optional,
            min_occurs: None,
            default: None,
            unsettable: false,
            derived: false,
            changeable: true,
            group: None,
            xml_kind,
            xml_name: None,
            namespace: None,
        }
    }

    /// A scalar feature serialized as an XML attribute.
    #[must_use]
    pub fn attribute(name: &str, datatype: &str) -> Self {
        Self::new(name, PendingKind::Attribute(datatype.to_owned()), XmlKind::Attribute)
    }

    /// A scalar feature serialized as a child element.
    #[must_use]
    pub fn element(name: &str, datatype: &str) -> Self {
        Self::new(name, PendingKind::Attribute(datatype.to_owned()), XmlKind::Element)
    }

    /// A scalar feature serialized as the element's text content.
    #[must_use]
    pub fn text(name: &str, datatype: &str) -> Self {
        Self::new(name, PendingKind::Attribute(datatype.to_owned()), XmlKind::Simple)
    }

    /// A containment reference: the target record is owned by the holder.
    #[must_use]
    pub fn contains(name: &str, target: &str) -> Self {
        Self::new(
            name,
            PendingKind::Reference {
                target: target.to_owned(),
                containment: true,
            },
            XmlKind::Element,
        )
    }

    /// A non-containment reference: a weak link by id.
    #[must_use]
    pub fn refers(name: &str, target: &str) -> Self {
        Self::new(
            name,
            PendingKind::Reference {
                target: target.to_owned(),
                containment: false,
            },
            XmlKind::Attribute,
        )
    }

    /// A mixed-content group. Always many-valued.
    #[must_use]
    pub fn group(name: &str) -> Self {
        let mut f = Self::new(name, PendingKind::Group, XmlKind::Group);
        f.cardinality = Cardinality::List;
        f
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.cardinality = Cardinality::Required;
        self
    }

    #[must_use]
    pub fn many(mut self) -> Self {
        self.cardinality = Cardinality::List;
        self
    }

    /// Minimum item count for a many-valued feature.
    #[must_use]
    pub fn at_least(mut self, n: usize) -> Self {
        self.min_occurs = Some(n);
        self
    }

    /// Default literal, parsed with the feature's datatype at build time.
    #[must_use]
    pub fn default_literal(mut self, literal: &str) -> Self {
        self.default = Some(literal.to_owned());
        self
    }

    #[must_use]
    pub fn unsettable(mut self) -> Self {
        self.unsettable = true;
        self
    }

    #[must_use]
    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Rejects writes through the reflective accessor.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.changeable = false;
        self
    }

    /// Projects this feature from a group feature declared earlier.
    #[must_use]
    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_owned());
        self.derived = true;
        self
    }

    #[must_use]
    pub fn xml_name(mut self, name: &str) -> Self {
        self.xml_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn xml_kind(mut self, kind: XmlKind) -> Self {
        self.xml_kind = kind;
        self
    }

    #[must_use]
    pub fn namespace(mut self, ns_uri: &str) -> Self {
        self.namespace = Some(ns_uri.to_owned());
        self
    }
}

/// Declares one record type.
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    name: String,
    supertype: Option<String>,
    is_abstract: bool,
    features: Vec<FeatureBuilder>,
}

impl RecordTypeBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            supertype: None,
            is_abstract: false,
            features: Vec::new(),
        }
    }

    /// Inherits the supertype's features, which come first.
    #[must_use]
    pub fn extends(mut self, supertype: &str) -> Self {
        self.supertype = Some(supertype.to_owned());
        self
    }

    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn feature(mut self, feature: FeatureBuilder) -> Self {
        self.features.push(feature);
        self
    }
}

/// Declares one package (namespace).
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    name: String,
    ns_uri: String,
    prefix: String,
    datatypes: Vec<DataType>,
    records: Vec<RecordTypeBuilder>,
}

impl PackageBuilder {
    #[must_use]
    pub fn new(name: &str, ns_uri: &str, prefix: &str) -> Self {
        Self {
            name: name.to_owned(),
            ns_uri: ns_uri.to_owned(),
            prefix: prefix.to_owned(),
            datatypes: Vec::new(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn datatype(mut self, datatype: DataType) -> Self {
        self.datatypes.push(datatype);
        self
    }

    #[must_use]
    pub fn record(mut self, record: RecordTypeBuilder) -> Self {
        self.records.push(record);
        self
    }
}

/// Collects packages and builds an immutable [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    packages: Vec<PackageBuilder>,
}

/// The XML Schema builtins every registry carries.
fn builtin_package() -> PackageBuilder {
    Primitive::ALL
        .iter()
        .fold(PackageBuilder::new("xml-type", XSD_NS, "xsd"), |p, prim| {
            p.datatype(DataType::primitive(*prim))
        })
}

struct PendingType {
    namespace: String,
    builder: RecordTypeBuilder,
    supertype: Option<RecordTypeId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    InProgress,
    Done,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn package(mut self, package: PackageBuilder) -> Self {
        self.packages.push(package);
        self
    }

    pub fn build(self) -> ModelResult<Registry> {
        let mut registry = Registry::default();
        let mut pending = Vec::new();

        for p in std::iter::once(builtin_package()).chain(self.packages) {
            if registry.package(&p.ns_uri).is_some() {
                return Err(ModelError::DuplicateName(p.ns_uri));
            }
            if registry.package_by_prefix(&p.prefix).is_some() {
                return Err(ModelError::DuplicateName(p.prefix));
            }
            let mut package = Package {
                name: p.name,
                ns_uri: p.ns_uri,
                prefix: p.prefix,
                record_types: Vec::new(),
                datatypes: Vec::new(),
            };
            for dt in p.datatypes {
                let key = (package.ns_uri.clone(), dt.name().to_owned());
                if registry.datatypes_by_name.contains_key(&key) {
                    return Err(ModelError::DuplicateName(format!("{}:{}", package.prefix, key.1)));
                }
                let id = DataTypeId::new(registry.datatypes.len() as u32);
                registry.datatypes_by_name.insert(key, id);
                registry.datatypes.push(dt);
                package.datatypes.push(id);
            }
            for rb in p.records {
                let key = (package.ns_uri.clone(), rb.name.clone());
                if registry.types_by_name.contains_key(&key) {
                    return Err(ModelError::DuplicateName(format!("{}:{}", package.prefix, rb.name)));
                }
                let id = RecordTypeId::new(registry.record_types.len() as u32);
                registry.types_by_name.insert(key, id);
                registry.record_types.push(RecordType {
                    id,
                    name: rb.name.clone(),
                    namespace: package.ns_uri.clone(),
                    supertype: None,
                    is_abstract: rb.is_abstract,
                    features: Vec::new(),
                    own_from: 0,
                });
                package.record_types.push(id);
                pending.push(PendingType {
                    namespace: package.ns_uri.clone(),
                    builder: rb,
                    supertype: None,
                });
            }
            registry.packages.push(package);
        }

        for (i, p) in pending.iter_mut().enumerate() {
            if let Some(sup) = &p.builder.supertype {
                let id = registry
                    .lookup_record_type(Some(&p.namespace), sup)
                    .ok_or_else(|| ModelError::UnknownType(sup.clone()))?;
                p.supertype = Some(id);
                registry.record_types[i].supertype = Some(id);
            }
        }

        let mut visits = vec![Visit::New; pending.len()];
        for i in 0..pending.len() {
            flatten(&mut registry, &pending, &mut visits, i)?;
        }

        debug!(
            packages = registry.packages.len(),
            record_types = registry.record_types.len(),
            datatypes = registry.datatypes.len(),
            "Registry built"
        );
        Ok(registry)
    }
}

/// Builds the feature table of type `i` after its supertype's.
fn flatten(
    registry: &mut Registry,
    pending: &[PendingType],
    visits: &mut [Visit],
    i: usize,
) -> ModelResult<()> {
    match visits[i] {
        Visit::Done => return Ok(()),
        Visit::InProgress => {
            return Err(ModelError::UnsupportedOperation(format!(
                "inheritance cycle through {}",
                pending[i].builder.name
            )));
        }
        Visit::New => visits[i] = Visit::InProgress,
    }

    let type_id = RecordTypeId::new(i as u32);
    let mut features = match pending[i].supertype {
        Some(sup) => {
            flatten(registry, pending, visits, sup.index())?;
            registry.record_types[sup.index()].features.clone()
        }
        None => Vec::new(),
    };
    let own_from = features.len();

    for fb in &pending[i].builder.features {
        let descriptor = resolve_feature(registry, &pending[i], type_id, &features, fb)?;
        features.push(descriptor);
    }

    let rt = &mut registry.record_types[i];
    rt.features = features;
    rt.own_from = own_from;
    visits[i] = Visit::Done;
    Ok(())
}

fn resolve_feature(
    registry: &Registry,
    owner: &PendingType,
    type_id: RecordTypeId,
    existing: &[FeatureDescriptor],
    fb: &FeatureBuilder,
) -> ModelResult<FeatureDescriptor> {
    let type_name = &owner.builder.name;
    if existing.iter().any(|f| f.name == fb.name) {
        return Err(ModelError::DuplicateName(format!("{type_name}.{}", fb.name)));
    }
    let index = u16::try_from(existing.len()).map_err(|_| ModelError::IndexOutOfRange {
        target: type_name.clone(),
        index: existing.len(),
        count: usize::from(u16::MAX),
    })?;

    let kind = match &fb.kind {
        PendingKind::Attribute(name) => FeatureKind::Attribute {
            datatype: registry
                .lookup_datatype(Some(&owner.namespace), name)
                .ok_or_else(|| ModelError::UnknownType(name.clone()))?,
        },
        PendingKind::Reference { target, containment } => FeatureKind::Reference {
            target: registry
                .lookup_record_type(Some(&owner.namespace), target)
                .ok_or_else(|| ModelError::UnknownType(target.clone()))?,
            containment: *containment,
        },
        PendingKind::Group => FeatureKind::Group,
    };

    let group = match &fb.group {
        Some(group_name) => {
            let g = existing
                .iter()
                .find(|f| &f.name == group_name && f.is_group())
                .ok_or_else(|| ModelError::UnknownFeature {
                    record_type: type_name.clone(),
                    feature: group_name.clone(),
                })?;
            Some(g.id)
        }
        None => None,
    };

    let many = fb.cardinality == Cardinality::List;
    let is_containment = matches!(kind, FeatureKind::Reference { containment: true, .. });
    let default = match (&fb.default, kind) {
        (Some(literal), FeatureKind::Attribute { datatype }) if !many => {
            registry.datatype(datatype)?.parse_literal(literal)?
        }
        (Some(_), _) => {
            return Err(ModelError::UnsupportedOperation(format!(
                "default literal on {type_name}.{}: only single-valued attributes take defaults",
                fb.name
            )));
        }
        (None, _) if many => Value::List(Vec::new()),
        (None, FeatureKind::Attribute { datatype }) => registry.datatype(datatype)?.intrinsic_default(),
        (None, _) => Value::Null,
    };

    let min_occurs = fb
        .min_occurs
        .unwrap_or(usize::from(fb.cardinality == Cardinality::Required));

    let namespace = match (&fb.namespace, fb.xml_kind) {
        (Some(ns), _) => Some(ns.clone()),
        (None, XmlKind::Element) => Some(owner.namespace.clone()),
        (None, _) => None,
    };

    Ok(FeatureDescriptor {
        id: FeatureId::new(index),
        name: fb.name.clone(),
        kind,
        cardinality: fb.cardinality,
        min_occurs,
        default,
        unsettable: fb.unsettable || many || is_containment || group.is_some(),
        derived: fb.derived,
        changeable: fb.changeable,
        group,
        xml: XmlMapping {
            kind: fb.xml_kind,
            name: fb.xml_name.clone().unwrap_or_else(|| fb.name.clone()),
            namespace,
        },
        declared_by: type_id,
    })
}
