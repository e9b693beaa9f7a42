//! Schema-driven record model with reflective access and change notification.
//!
//! - [`Registry`]: immutable schema metadata (packages, record types with
//!   their flattened [`FeatureDescriptor`] tables, datatypes). Built once by
//!   [`RegistryBuilder`]; [`LazyRegistry`] guards a process-wide instance.
//! - [`RecordStore`]: arena of live [`Record`]s and the Reflective Accessor
//!   (`get` / `set` / `unset` / `is_set`, [`ListView`] for many-valued
//!   features). Owns containment bookkeeping.
//! - [`ChangeEvent`] / [`ChangeListener`]: synchronous notification after
//!   every committed mutation.
//! - [`Factory`]: per-package record creation and scalar literal conversion.
//! - [`Validator`]: required-feature, facet and dangling-reference checks.
//!
//! Concrete schemas (the OWS packages) are plain data fed to the builder and
//! live in `owsmodel-ows`.

mod builder;
mod config;
mod factory;
mod list;
mod notify;
mod record;
mod registry;
mod schema;
mod store;
mod validate;

pub use builder::{FeatureBuilder, PackageBuilder, RecordTypeBuilder, RegistryBuilder};
pub use config::{StoreConfig, ValidationConfig};
pub use factory::Factory;
pub use list::ListView;
pub use notify::{ChangeEvent, ChangeKind, ChangeListener, ListenerId};
pub use record::{Container, Record, Slot};
pub use registry::{LazyRegistry, Package, Registry, XSD_NS};
pub use schema::{Cardinality, FeatureDescriptor, FeatureKind, RecordType, XmlKind, XmlMapping};
pub use store::{FeatureKey, RecordStore};
pub use validate::{Diagnostic, Problem, Severity, Validator};
