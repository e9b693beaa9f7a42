//! Core type definitions for the OWS object model.
//!
//! This crate defines the schema-independent building blocks every other
//! crate in the workspace depends on:
//! - Record and schema identifiers ([`RecordId`], [`RecordTypeId`], [`DataTypeId`], [`FeatureId`])
//! - The dynamic [`Value`] stored in record slots
//! - Scalar datatypes: XML Schema primitives, enumerations and whitespace lists
//! - The literal codec that converts between scalar values and their XML text form
//!
//! Nothing in here knows about a concrete schema. Record types, features and
//! the registry live in `owsmodel-model`; the OWS packages live in `owsmodel-ows`.

mod codec;
mod datatype;
mod error;
mod ids;
mod value;

pub use datatype::{DataKind, DataType, EnumLiteral, EnumType, Facets, Primitive};
pub use error::{ModelError, ModelResult};
pub use ids::{DataTypeId, FeatureId, RecordId, RecordTypeId};
pub use value::{FeatureEntry, Value};
