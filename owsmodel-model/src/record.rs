use crate::schema::RecordType;
use owsmodel_types::{FeatureId, RecordId, RecordTypeId, Value};
use serde::Serialize;

/// Storage of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Slot {
    Single(Value),
    Many(Vec<Value>),
}

impl Slot {
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Single(v) => v.clone(),
            Self::Many(items) => Value::List(items.clone()),
        }
    }

    pub(crate) fn items(&self) -> &[Value] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Many(items) => items,
        }
    }
}

/// Where a contained record lives: its owner and the feature holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Container {
    pub owner: RecordId,
    /// The containment feature, or the group member feature for group entries.
    pub feature: FeatureId,
}

/// A live instance of a record type.
///
/// Records are created and mutated only through the [`crate::RecordStore`];
/// this type exposes read access to the raw storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub(crate) id: RecordId,
    pub(crate) record_type: RecordTypeId,
    pub(crate) slots: Vec<Slot>,
    pub(crate) explicitly_set: Vec<bool>,
    pub(crate) container: Option<Container>,
}

impl Record {
    /// A record with every feature at its declared default and nothing set.
    pub(crate) fn new(rt: &RecordType) -> Self {
        let slots = rt
            .features()
            .iter()
            .map(|f| {
                if f.is_many() {
                    Slot::Many(Vec::new())
                } else {
                    Slot::Single(f.default_value().clone())
                }
            })
            .collect();
        Self {
            id: RecordId::new(),
            record_type: rt.id(),
            slots,
            explicitly_set: vec![false; rt.feature_count()],
            container: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    #[must_use]
    pub fn record_type(&self) -> RecordTypeId {
        self.record_type
    }

    #[must_use]
    pub fn container(&self) -> Option<Container> {
        self.container
    }

    /// Whether this record is owned by another one.
    #[must_use]
    pub fn is_contained(&self) -> bool {
        self.container.is_some()
    }

    /// Raw slot storage, indexed by feature id.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}
