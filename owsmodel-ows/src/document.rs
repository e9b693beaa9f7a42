//! Typed access to the mixed content of `ows:DocumentRoot`.
//!
//! The root stores its global elements as ordered `(feature, value)`
//! entries in the `mixed` group. [`DocumentElement`] names each member
//! feature as a variant so callers match instead of inspecting entries.

use crate::{OWS_NS, RangeClosure};
use owsmodel_model::RecordStore;
use owsmodel_types::{ModelError, ModelResult, RecordId, Value};
use tracing::trace;

const ROOT_TYPE: &str = "DocumentRoot";
const GROUP: &str = "mixed";

/// One global element held by a document root.
///
/// Record-valued variants hold the id of a record contained by the root.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentElement {
    Abstract(RecordId),
    Title(RecordId),
    Keywords(RecordId),
    Identifier(RecordId),
    Metadata(RecordId),
    BoundingBox(RecordId),
    Wgs84BoundingBox(RecordId),
    Range(RecordId),
    GetCapabilities(RecordId),
    Exception(RecordId),
    ExceptionReport(RecordId),
    ServiceIdentification(RecordId),
    OutputFormat(String),
    Language(String),
    Fees(String),
    AccessConstraints(String),
    RangeClosure(RangeClosure),
}

impl DocumentElement {
    /// Name of the `DocumentRoot` feature this element is projected to.
    #[must_use]
    pub fn feature_name(&self) -> &'static str {
        match self {
            Self::Abstract(_) => "abstract",
            Self::Title(_) => "title",
            Self::Keywords(_) => "keywords",
            Self::Identifier(_) => "identifier",
            Self::Metadata(_) => "metadata",
            Self::BoundingBox(_) => "boundingBox",
            Self::Wgs84BoundingBox(_) => "wgs84BoundingBox",
            Self::Range(_) => "range",
            Self::GetCapabilities(_) => "getCapabilities",
            Self::Exception(_) => "exception",
            Self::ExceptionReport(_) => "exceptionReport",
            Self::ServiceIdentification(_) => "serviceIdentification",
            Self::OutputFormat(_) => "outputFormat",
            Self::Language(_) => "language",
            Self::Fees(_) => "fees",
            Self::AccessConstraints(_) => "accessConstraints",
            Self::RangeClosure(_) => "rangeClosure",
        }
    }

    /// The contained record, for record-valued elements.
    #[must_use]
    pub fn record(&self) -> Option<RecordId> {
        match self {
            Self::Abstract(id)
            | Self::Title(id)
            | Self::Keywords(id)
            | Self::Identifier(id)
            | Self::Metadata(id)
            | Self::BoundingBox(id)
            | Self::Wgs84BoundingBox(id)
            | Self::Range(id)
            | Self::GetCapabilities(id)
            | Self::Exception(id)
            | Self::ExceptionReport(id)
            | Self::ServiceIdentification(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::OutputFormat(s) | Self::Language(s) | Self::Fees(s) | Self::AccessConstraints(s) => {
                Value::String(s)
            }
            Self::RangeClosure(c) => c.into(),
            other => other.record().map_or(Value::Null, Value::Record),
        }
    }

    /// Rebuilds an element from a member feature name and its value.
    pub fn from_entry(feature: &str, value: &Value) -> ModelResult<Self> {
        let mismatch = |expected: &str| {
            ModelError::type_mismatch(format!("{ROOT_TYPE}.{feature}"), expected, value.kind_name())
        };
        let record = || value.as_record().ok_or_else(|| mismatch("record"));
        let text = || {
            value
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| mismatch("string"))
        };
        Ok(match feature {
            "abstract" => Self::Abstract(record()?),
            "title" => Self::Title(record()?),
            "keywords" => Self::Keywords(record()?),
            "identifier" => Self::Identifier(record()?),
            "metadata" => Self::Metadata(record()?),
            "boundingBox" => Self::BoundingBox(record()?),
            "wgs84BoundingBox" => Self::Wgs84BoundingBox(record()?),
            "range" => Self::Range(record()?),
            "getCapabilities" => Self::GetCapabilities(record()?),
            "exception" => Self::Exception(record()?),
            "exceptionReport" => Self::ExceptionReport(record()?),
            "serviceIdentification" => Self::ServiceIdentification(record()?),
            "outputFormat" => Self::OutputFormat(text()?),
            "language" => Self::Language(text()?),
            "fees" => Self::Fees(text()?),
            "accessConstraints" => Self::AccessConstraints(text()?),
            "rangeClosure" => Self::RangeClosure(RangeClosure::try_from(value)?),
            _ => {
                return Err(ModelError::UnknownFeature {
                    record_type: ROOT_TYPE.to_owned(),
                    feature: feature.to_owned(),
                });
            }
        })
    }
}

fn check_root(store: &RecordStore, root: RecordId) -> ModelResult<()> {
    let expected = store.registry().find_record_type(OWS_NS, ROOT_TYPE)?.id();
    let actual = store.record(root)?.record_type();
    if actual == expected {
        Ok(())
    } else {
        Err(ModelError::type_mismatch(
            "document root",
            ROOT_TYPE,
            store.registry().qualified_name(actual),
        ))
    }
}

/// The elements of a document root, in document order.
pub fn elements(store: &RecordStore, root: RecordId) -> ModelResult<Vec<DocumentElement>> {
    check_root(store, root)?;
    let rt = store.record_type_of(root)?;
    let mixed = store.get(root, GROUP)?;
    mixed
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_entry)
        .map(|entry| {
            let member = store.registry().feature_at(rt.id(), entry.feature.index())?;
            DocumentElement::from_entry(member.name(), &entry.value)
        })
        .collect()
}

/// Appends an element to a document root. Record-valued elements are
/// moved under the root, leaving any previous container.
pub fn push_element(store: &mut RecordStore, root: RecordId, element: DocumentElement) -> ModelResult<()> {
    check_root(store, root)?;
    let feature = store.registry().find_record_type(OWS_NS, ROOT_TYPE)?.feature_named(element.feature_name());
    let feature = feature
        .map(|f| f.id())
        .ok_or_else(|| ModelError::UnknownFeature {
            record_type: ROOT_TYPE.to_owned(),
            feature: element.feature_name().to_owned(),
        })?;
    trace!(record = %root, feature = element.feature_name(), "Document element appended");
    store
        .list(root, GROUP)?
        .push(Value::entry(feature, element.into_value()))
}
