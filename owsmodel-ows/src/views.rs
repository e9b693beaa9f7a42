//! Named accessors over records of a few frequently used OWS types.
//!
//! A view is a checked [`RecordId`]; every call goes through the store's
//! reflective accessors, so listeners and containment behave exactly as
//! with the generic API.

use crate::OWS_NS;
use owsmodel_model::RecordStore;
use owsmodel_types::{ModelError, ModelResult, RecordId, Value};

/// Fails unless `id` is a record of `type_name` or one of its subtypes.
fn check_type(store: &RecordStore, id: RecordId, type_name: &str) -> ModelResult<()> {
    let expected = store.registry().find_record_type(OWS_NS, type_name)?.id();
    let actual = store.record(id)?.record_type();
    if store.registry().is_subtype(actual, expected) {
        Ok(())
    } else {
        Err(ModelError::type_mismatch(
            format!("{type_name} view"),
            type_name,
            store.registry().qualified_name(actual),
        ))
    }
}

fn create(store: &mut RecordStore, type_name: &str) -> ModelResult<RecordId> {
    let type_id = store.registry().find_record_type(OWS_NS, type_name)?.id();
    store.create(type_id)
}

fn string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// `ows:CodeType`: a text value qualified by an optional code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeType(RecordId);

impl CodeType {
    const TYPE: &'static str = "CodeType";

    /// Creates an empty `CodeType` record.
    pub fn create(store: &mut RecordStore) -> ModelResult<Self> {
        create(store, Self::TYPE).map(Self)
    }

    /// Wraps an existing record.
    pub fn wrap(store: &RecordStore, id: RecordId) -> ModelResult<Self> {
        check_type(store, id, Self::TYPE)?;
        Ok(Self(id))
    }

    #[must_use]
    pub fn id(&self) -> RecordId {
        self.0
    }

    pub fn value(&self, store: &RecordStore) -> ModelResult<Option<String>> {
        store.get(self.0, "value").map(string)
    }

    pub fn set_value(&self, store: &mut RecordStore, value: &str) -> ModelResult<()> {
        store.set(self.0, "value", value)
    }

    pub fn code_space(&self, store: &RecordStore) -> ModelResult<Option<String>> {
        store.get(self.0, "codeSpace").map(string)
    }

    /// `None` clears the code space.
    pub fn set_code_space(&self, store: &mut RecordStore, code_space: Option<&str>) -> ModelResult<()> {
        store.set(self.0, "codeSpace", code_space)
    }
}

/// `ows:BoundingBoxType` or its WGS 84 subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox(RecordId);

impl BoundingBox {
    const TYPE: &'static str = "BoundingBoxType";
    const WGS84_TYPE: &'static str = "WGS84BoundingBoxType";

    /// Creates a bounding box with the given corners.
    pub fn create(store: &mut RecordStore, lower: &[f64], upper: &[f64]) -> ModelResult<Self> {
        let bbox = create(store, Self::TYPE).map(Self)?;
        bbox.set_corners(store, lower, upper)?;
        Ok(bbox)
    }

    /// Creates a `WGS84BoundingBoxType` record with the given corners.
    pub fn create_wgs84(store: &mut RecordStore, lower: &[f64], upper: &[f64]) -> ModelResult<Self> {
        let bbox = create(store, Self::WGS84_TYPE).map(Self)?;
        bbox.set_corners(store, lower, upper)?;
        Ok(bbox)
    }

    pub fn wrap(store: &RecordStore, id: RecordId) -> ModelResult<Self> {
        check_type(store, id, Self::TYPE)?;
        Ok(Self(id))
    }

    #[must_use]
    pub fn id(&self) -> RecordId {
        self.0
    }

    /// Whether the record is a `WGS84BoundingBoxType`.
    pub fn is_wgs84(&self, store: &RecordStore) -> ModelResult<bool> {
        let wgs84 = store.registry().find_record_type(OWS_NS, Self::WGS84_TYPE)?.id();
        Ok(store.registry().is_subtype(store.record(self.0)?.record_type(), wgs84))
    }

    /// The lower corner; empty when unset.
    pub fn lower_corner(&self, store: &RecordStore) -> ModelResult<Vec<f64>> {
        Ok(store.get(self.0, "lowerCorner")?.to_f64_vec().unwrap_or_default())
    }

    /// The upper corner; empty when unset.
    pub fn upper_corner(&self, store: &RecordStore) -> ModelResult<Vec<f64>> {
        Ok(store.get(self.0, "upperCorner")?.to_f64_vec().unwrap_or_default())
    }

    /// Sets both corners. They must have the same number of ordinates.
    pub fn set_corners(&self, store: &mut RecordStore, lower: &[f64], upper: &[f64]) -> ModelResult<()> {
        if lower.len() != upper.len() {
            return Err(ModelError::type_mismatch(
                "BoundingBoxType.upperCorner",
                format!("{} ordinates", lower.len()),
                format!("{} ordinates", upper.len()),
            ));
        }
        store.set(self.0, "lowerCorner", lower)?;
        store.set(self.0, "upperCorner", upper)
    }

    pub fn crs(&self, store: &RecordStore) -> ModelResult<Option<String>> {
        store.get(self.0, "crs").map(string)
    }

    pub fn set_crs(&self, store: &mut RecordStore, crs: Option<&str>) -> ModelResult<()> {
        store.set(self.0, "crs", crs)
    }

    /// The declared dimension count, if any.
    pub fn dimensions(&self, store: &RecordStore) -> ModelResult<Option<u64>> {
        Ok(store
            .get(self.0, "dimensions")?
            .as_i64()
            .and_then(|d| u64::try_from(d).ok()))
    }

    pub fn set_dimensions(&self, store: &mut RecordStore, dimensions: Option<u64>) -> ModelResult<()> {
        let value = match dimensions {
            Some(d) => Value::Int(i64::try_from(d).map_err(|_| {
                ModelError::type_mismatch("BoundingBoxType.dimensions", "positiveInteger", "u64")
            })?),
            None => Value::Null,
        };
        store.set(self.0, "dimensions", value)
    }
}
