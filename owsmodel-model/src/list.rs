use crate::notify::{ChangeEvent, ChangeKind};
use crate::store::RecordStore;
use owsmodel_types::{FeatureId, ModelError, ModelResult, RecordId, RecordTypeId, Value};
use std::sync::Arc;
use tracing::trace;

/// Live, mutable view over one many-valued feature of one record.
///
/// Holds the store mutably for its lifetime. Each mutation publishes one
/// event. Removing a contained record destroys it; inserting one transfers
/// it from wherever it was contained before.
pub struct ListView<'s> {
    store: &'s mut RecordStore,
    record: RecordId,
    record_type: RecordTypeId,
    feature: FeatureId,
}

impl<'s> ListView<'s> {
    pub(crate) fn new(
        store: &'s mut RecordStore,
        record: RecordId,
        record_type: RecordTypeId,
        feature: FeatureId,
    ) -> Self {
        Self {
            store,
            record,
            record_type,
            feature,
        }
    }

    // The record was resolved when the view was opened and the view holds the
    // store exclusively, so the lookup cannot miss while it lives.
    fn items(&self) -> &[Value] {
        self.store.items(self.record, self.feature).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items().iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.items().to_vec()
    }

    pub fn push(&mut self, value: impl Into<Value>) -> ModelResult<()> {
        let len = self.len();
        self.insert(len, value)
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> ModelResult<()> {
        let value = value.into();
        let mut items = self.checked(index, self.len() + 1)?;
        self.check(&value)?;
        items.insert(index, value.clone());
        self.commit(items)?;
        trace!(record = %self.record, feature = %self.feature, index, "List item added");
        self.store.publish(self.record, false, || ChangeEvent {
            record: self.record,
            feature: self.feature,
            kind: ChangeKind::Add,
            old: Value::Null,
            new: value,
            position: Some(index),
        });
        Ok(())
    }

    /// Removes and returns the item at `index`. A removed contained
    /// record is destroyed; the returned id no longer resolves.
    pub fn remove(&mut self, index: usize) -> ModelResult<Value> {
        let mut items = self.checked(index, self.len())?;
        let old = items.remove(index);
        self.commit(items)?;
        trace!(record = %self.record, feature = %self.feature, index, "List item removed");
        let removed = old.clone();
        self.store.publish(self.record, false, || ChangeEvent {
            record: self.record,
            feature: self.feature,
            kind: ChangeKind::Remove,
            old: removed,
            new: Value::Null,
            position: Some(index),
        });
        Ok(old)
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> ModelResult<Value> {
        let value = value.into();
        let mut items = self.checked(index, self.len())?;
        self.check(&value)?;
        let old = std::mem::replace(&mut items[index], value.clone());
        self.commit(items)?;
        let previous = old.clone();
        self.store.publish(self.record, previous == value, || ChangeEvent {
            record: self.record,
            feature: self.feature,
            kind: ChangeKind::Set,
            old: previous,
            new: value,
            position: Some(index),
        });
        Ok(old)
    }

    /// Removes every item. An already empty list publishes nothing.
    pub fn clear(&mut self) -> ModelResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        let old = self.commit(Vec::new())?;
        trace!(record = %self.record, feature = %self.feature, count = old.len(), "List cleared");
        self.store.publish(self.record, false, || ChangeEvent {
            record: self.record,
            feature: self.feature,
            kind: ChangeKind::RemoveMany,
            old: Value::List(old),
            new: Value::List(Vec::new()),
            position: None,
        });
        Ok(())
    }

    /// A copy of the items, after checking `index < bound`.
    fn checked(&self, index: usize, bound: usize) -> ModelResult<Vec<Value>> {
        if index >= bound {
            let registry = Arc::clone(self.store.registry());
            let rt = registry.record_type(self.record_type)?;
            let f = registry.feature_at(self.record_type, self.feature.index())?;
            return Err(ModelError::IndexOutOfRange {
                target: format!("{}.{}", rt.name(), f.name()),
                index,
                count: self.len(),
            });
        }
        Ok(self.to_vec())
    }

    fn check(&self, value: &Value) -> ModelResult<()> {
        let registry = Arc::clone(self.store.registry());
        let rt = registry.record_type(self.record_type)?;
        let f = registry.feature_at(self.record_type, self.feature.index())?;
        self.store.check_item(self.record, rt, f, value)
    }

    fn commit(&mut self, items: Vec<Value>) -> ModelResult<Vec<Value>> {
        let registry = Arc::clone(self.store.registry());
        let rt = registry.record_type(self.record_type)?;
        let f = registry.feature_at(self.record_type, self.feature.index())?;
        self.store.replace_items(self.record, rt, f, items)
    }
}

impl std::fmt::Debug for ListView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("record", &self.record)
            .field("feature", &self.feature)
            .field("items", &self.items())
            .finish()
    }
}
