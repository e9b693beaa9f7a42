//! OWS Common 2.0 and XLink expressed as registry data.
//!
//! The schemas are plain [`PackageBuilder`](owsmodel_model::PackageBuilder)
//! declarations; every record of these packages is read and written through
//! the generic [`RecordStore`] accessors. On top of that this crate adds a
//! few typed conveniences:
//! - [`RangeClosure`], the `RangeClosureType` enumeration as a Rust enum
//! - [`CodeType`] and [`BoundingBox`], named accessors over a store
//! - [`DocumentElement`], the document root's mixed content as a tagged union
//!
//! The registry is built once per process on first use:
//!
//! ```no_run
//! let factory = owsmodel_ows::factory()?;
//! let mut store = owsmodel_ows::store()?;
//! let code = factory.create(&mut store, "CodeType")?;
//! store.set(code, "codeSpace", "EPSG")?;
//! # Ok::<(), owsmodel_types::ModelError>(())
//! ```

mod document;
mod ows20;
mod range_closure;
mod views;
mod xlink;

use owsmodel_model::{
    Factory, LazyRegistry, PackageBuilder, RecordStore, Registry, RegistryBuilder, StoreConfig,
};
use owsmodel_types::ModelResult;
use std::sync::Arc;

pub use document::{DocumentElement, elements, push_element};
pub use range_closure::RangeClosure;
pub use views::{BoundingBox, CodeType};

/// Namespace of the OWS 2.0 package.
pub const OWS_NS: &str = "http://www.opengis.net/ows/2.0";

/// Namespace of the XLink package.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

static REGISTRY: LazyRegistry = LazyRegistry::new(build_registry);

/// Builds a fresh registry holding the XLink and OWS 2.0 packages.
///
/// Most callers want the shared instance from [`registry`]; this is for
/// tests and tools that need an independent copy.
pub fn build_registry() -> ModelResult<Registry> {
    RegistryBuilder::new()
        .package(xlink_package())
        .package(ows_package())
        .build()
}

/// The XLink package declaration, for registries that extend OWS.
#[must_use]
pub fn xlink_package() -> PackageBuilder {
    xlink::package()
}

/// The OWS 2.0 package declaration. It refers to XLink datatypes, so
/// register [`xlink_package`] alongside it.
#[must_use]
pub fn ows_package() -> PackageBuilder {
    ows20::package()
}

/// The process-wide OWS registry.
pub fn registry() -> ModelResult<Arc<Registry>> {
    REGISTRY.get()
}

/// Whether [`registry`] has already run.
#[must_use]
pub fn is_initialized() -> bool {
    REGISTRY.is_initialized()
}

/// Factory for the OWS 2.0 package of the shared registry.
pub fn factory() -> ModelResult<Factory> {
    Factory::new(registry()?, OWS_NS)
}

/// Factory for the XLink package. XLink declares datatypes only, so this is
/// useful for scalar conversion.
pub fn xlink_factory() -> ModelResult<Factory> {
    Factory::new(registry()?, XLINK_NS)
}

/// An empty store over the shared registry.
pub fn store() -> ModelResult<RecordStore> {
    Ok(RecordStore::new(registry()?))
}

/// An empty store over the shared registry with explicit settings.
pub fn store_with(config: StoreConfig) -> ModelResult<RecordStore> {
    Ok(RecordStore::with_config(registry()?, config))
}
