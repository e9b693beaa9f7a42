//! The Feature Registry: process-wide, immutable schema metadata.
//!
//! A [`Registry`] is built once by [`crate::RegistryBuilder`] and never
//! mutated afterwards, so it can be shared freely behind an `Arc`.
//! [`LazyRegistry`] provides the guarded one-time initialization for a
//! process-wide instance.

use crate::schema::{FeatureDescriptor, RecordType};
use owsmodel_types::{DataType, DataTypeId, ModelError, ModelResult, RecordTypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Namespace of the builtin XML Schema datatypes package.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// A namespace of record types and datatypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub(crate) name: String,
    pub(crate) ns_uri: String,
    pub(crate) prefix: String,
    pub(crate) record_types: Vec<RecordTypeId>,
    pub(crate) datatypes: Vec<DataTypeId>,
}

impl Package {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ns_uri(&self) -> &str {
        &self.ns_uri
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn record_types(&self) -> &[RecordTypeId] {
        &self.record_types
    }

    #[must_use]
    pub fn datatypes(&self) -> &[DataTypeId] {
        &self.datatypes
    }
}

/// Immutable schema metadata: packages, record types and datatypes.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) packages: Vec<Package>,
    pub(crate) record_types: Vec<RecordType>,
    pub(crate) datatypes: Vec<DataType>,
    pub(crate) types_by_name: HashMap<(String, String), RecordTypeId>,
    pub(crate) datatypes_by_name: HashMap<(String, String), DataTypeId>,
}

impl Registry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> crate::RegistryBuilder {
        crate::RegistryBuilder::new()
    }

    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    #[must_use]
    pub fn package(&self, ns_uri: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.ns_uri == ns_uri)
    }

    #[must_use]
    pub fn package_by_prefix(&self, prefix: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.prefix == prefix)
    }

    pub fn record_types(&self) -> impl Iterator<Item = &RecordType> {
        self.record_types.iter()
    }

    pub fn datatypes(&self) -> impl Iterator<Item = (DataTypeId, &DataType)> {
        self.datatypes
            .iter()
            .enumerate()
            .map(|(i, dt)| (DataTypeId::new(i as u32), dt))
    }

    pub fn record_type(&self, id: RecordTypeId) -> ModelResult<&RecordType> {
        self.record_types
            .get(id.index())
            .ok_or_else(|| ModelError::UnknownType(id.to_string()))
    }

    /// Finds a record type by namespace URI and local name.
    pub fn find_record_type(&self, ns_uri: &str, name: &str) -> ModelResult<&RecordType> {
        self.types_by_name
            .get(&(ns_uri.to_owned(), name.to_owned()))
            .and_then(|id| self.record_types.get(id.index()))
            .ok_or_else(|| ModelError::UnknownType(format!("{{{ns_uri}}}{name}")))
    }

    /// Finds a record type by `prefix:Name`, or by bare name searched
    /// across packages in registration order.
    pub fn record_type_named(&self, qname: &str) -> ModelResult<&RecordType> {
        self.lookup_record_type(None, qname)
            .and_then(|id| self.record_types.get(id.index()))
            .ok_or_else(|| ModelError::UnknownType(qname.to_owned()))
    }

    pub fn datatype(&self, id: DataTypeId) -> ModelResult<&DataType> {
        self.datatypes
            .get(id.index())
            .ok_or_else(|| ModelError::UnknownType(id.to_string()))
    }

    /// Finds a datatype by namespace URI and local name.
    pub fn find_datatype(&self, ns_uri: &str, name: &str) -> ModelResult<(DataTypeId, &DataType)> {
        self.datatypes_by_name
            .get(&(ns_uri.to_owned(), name.to_owned()))
            .map(|id| (*id, &self.datatypes[id.index()]))
            .ok_or_else(|| ModelError::UnknownType(format!("{{{ns_uri}}}{name}")))
    }

    /// Finds a datatype by `prefix:name`, or by bare name (builtins first).
    pub fn datatype_named(&self, qname: &str) -> ModelResult<(DataTypeId, &DataType)> {
        self.lookup_datatype(None, qname)
            .map(|id| (id, &self.datatypes[id.index()]))
            .ok_or_else(|| ModelError::UnknownType(qname.to_owned()))
    }

    /// Ordered features of a record type, supertype features first.
    pub fn describe(&self, id: RecordTypeId) -> ModelResult<&[FeatureDescriptor]> {
        Ok(self.record_type(id)?.features())
    }

    /// The feature at `index`. An out-of-range index means the caller and
    /// the schema disagree, which is a programming error.
    pub fn feature_at(&self, id: RecordTypeId, index: usize) -> ModelResult<&FeatureDescriptor> {
        let rt = self.record_type(id)?;
        rt.features.get(index).ok_or_else(|| ModelError::IndexOutOfRange {
            target: rt.name.clone(),
            index,
            count: rt.features.len(),
        })
    }

    pub fn feature_named(&self, id: RecordTypeId, name: &str) -> ModelResult<&FeatureDescriptor> {
        let rt = self.record_type(id)?;
        rt.feature_named(name).ok_or_else(|| ModelError::UnknownFeature {
            record_type: rt.name.clone(),
            feature: name.to_owned(),
        })
    }

    /// Whether `sub` is `sup` or inherits from it.
    #[must_use]
    pub fn is_subtype(&self, sub: RecordTypeId, sup: RecordTypeId) -> bool {
        let mut current = Some(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.record_types.get(id.index()).and_then(|rt| rt.supertype);
        }
        false
    }

    /// Supertype chain of `id`, nearest first, excluding `id` itself.
    #[must_use]
    pub fn supertypes(&self, id: RecordTypeId) -> Vec<RecordTypeId> {
        let mut chain = Vec::new();
        let mut current = self.record_types.get(id.index()).and_then(|rt| rt.supertype);
        while let Some(sup) = current {
            chain.push(sup);
            current = self.record_types.get(sup.index()).and_then(|rt| rt.supertype);
        }
        chain
    }

    /// `prefix:Name` of a record type, for messages.
    #[must_use]
    pub fn qualified_name(&self, id: RecordTypeId) -> String {
        match self.record_types.get(id.index()) {
            Some(rt) => match self.package(&rt.namespace) {
                Some(p) => format!("{}:{}", p.prefix, rt.name),
                None => rt.name.clone(),
            },
            None => id.to_string(),
        }
    }

    /// Resolves a possibly-prefixed record type name, looking in
    /// `context_ns` first when the name is bare.
    pub(crate) fn lookup_record_type(&self, context_ns: Option<&str>, qname: &str) -> Option<RecordTypeId> {
        if let Some((prefix, local)) = qname.split_once(':') {
            let package = self.package_by_prefix(prefix)?;
            return self.types_by_name.get(&(package.ns_uri.clone(), local.to_owned())).copied();
        }
        if let Some(ns) = context_ns {
            if let Some(id) = self.types_by_name.get(&(ns.to_owned(), qname.to_owned())) {
                return Some(*id);
            }
        }
        self.packages.iter().find_map(|p| {
            self.types_by_name
                .get(&(p.ns_uri.clone(), qname.to_owned()))
                .copied()
        })
    }

    /// Resolves a possibly-prefixed datatype name: `context_ns`, then the
    /// builtin package, then every package in registration order.
    pub(crate) fn lookup_datatype(&self, context_ns: Option<&str>, qname: &str) -> Option<DataTypeId> {
        if let Some((prefix, local)) = qname.split_once(':') {
            let package = self.package_by_prefix(prefix)?;
            return self
                .datatypes_by_name
                .get(&(package.ns_uri.clone(), local.to_owned()))
                .copied();
        }
        context_ns
            .into_iter()
            .chain(std::iter::once(XSD_NS))
            .chain(self.packages.iter().map(|p| p.ns_uri.as_str()))
            .find_map(|ns| {
                self.datatypes_by_name
                    .get(&(ns.to_owned(), qname.to_owned()))
                    .copied()
            })
    }
}

/// A process-wide registry built on first use.
///
/// Only one initialization ever runs. Callers racing the first `get` block
/// until it completes; `try_get` observes either nothing or the finished
/// registry, never a partial one. A failed build is remembered and returned
/// to every caller.
pub struct LazyRegistry {
    cell: OnceLock<ModelResult<Arc<Registry>>>,
    init: fn() -> ModelResult<Registry>,
}

impl LazyRegistry {
    #[must_use]
    pub const fn new(init: fn() -> ModelResult<Registry>) -> Self {
        Self {
            cell: OnceLock::new(),
            init,
        }
    }

    /// Returns the shared registry, building it on first access.
    pub fn get(&self) -> ModelResult<Arc<Registry>> {
        self.cell
            .get_or_init(|| {
                let built = (self.init)().map(Arc::new);
                match &built {
                    Ok(registry) => debug!(
                        packages = registry.packages.len(),
                        record_types = registry.record_types.len(),
                        "Registry initialized"
                    ),
                    Err(e) => warn!(error = %e, "Registry initialization failed"),
                }
                built
            })
            .clone()
    }

    /// Returns the registry only if initialization already completed successfully.
    #[must_use]
    pub fn try_get(&self) -> Option<Arc<Registry>> {
        self.cell.get().and_then(|r| r.as_ref().ok().cloned())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
