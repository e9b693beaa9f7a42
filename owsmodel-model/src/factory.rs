use crate::registry::{Package, Registry};
use crate::store::RecordStore;
use owsmodel_types::{DataType, ModelError, ModelResult, RecordId, RecordTypeId, Value};
use std::sync::Arc;
use tracing::trace;

/// Creates records and converts scalar literals for one package.
///
/// Names passed to a factory are resolved in its package first, so
/// `"CodeType"` and `"ows:CodeType"` mean the same thing to the OWS factory.
#[derive(Debug, Clone)]
pub struct Factory {
    registry: Arc<Registry>,
    ns_uri: String,
}

impl Factory {
    /// Binds a factory to the package registered under `ns_uri`.
    pub fn new(registry: Arc<Registry>, ns_uri: &str) -> ModelResult<Self> {
        if registry.package(ns_uri).is_none() {
            return Err(ModelError::UnknownType(format!("package {ns_uri}")));
        }
        Ok(Self {
            registry,
            ns_uri: ns_uri.to_owned(),
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn package(&self) -> ModelResult<&Package> {
        self.registry
            .package(&self.ns_uri)
            .ok_or_else(|| ModelError::UnknownType(format!("package {}", self.ns_uri)))
    }

    /// Creates a record of the named type in `store`.
    pub fn create(&self, store: &mut RecordStore, name: &str) -> ModelResult<RecordId> {
        let type_id = self
            .registry
            .lookup_record_type(Some(&self.ns_uri), name)
            .ok_or_else(|| ModelError::UnknownType(name.to_owned()))?;
        self.create_id(store, type_id)
    }

    /// Creates a record of a type of this package by id.
    pub fn create_id(&self, store: &mut RecordStore, type_id: RecordTypeId) -> ModelResult<RecordId> {
        if !Arc::ptr_eq(store.registry(), &self.registry) {
            return Err(ModelError::UnsupportedOperation(
                "store is bound to a different registry".to_owned(),
            ));
        }
        let rt = self.registry.record_type(type_id)?;
        if rt.namespace() != self.ns_uri {
            return Err(ModelError::UnknownType(format!(
                "{} is not a type of {}",
                self.registry.qualified_name(type_id),
                self.ns_uri
            )));
        }
        let id = store.create(type_id)?;
        trace!(record = %id, record_type = rt.name(), "Factory created record");
        Ok(id)
    }

    /// Parses the XML text of a scalar datatype.
    pub fn parse_scalar(&self, datatype: &str, literal: &str) -> ModelResult<Value> {
        self.datatype(datatype)?.parse_literal(literal)
    }

    /// Formats a scalar value as XML text.
    pub fn format_scalar(&self, datatype: &str, value: &Value) -> ModelResult<String> {
        self.datatype(datatype)?.format_value(value)
    }

    fn datatype(&self, name: &str) -> ModelResult<&DataType> {
        let id = self
            .registry
            .lookup_datatype(Some(&self.ns_uri), name)
            .ok_or_else(|| ModelError::UnknownType(name.to_owned()))?;
        self.registry.datatype(id)
    }
}
