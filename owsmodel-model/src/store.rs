//! The record store and its Reflective Accessor.
//!
//! Records live in an arena keyed by [`RecordId`]. Containment is tracked on
//! both sides: the owner's slot holds the child's id and the child records
//! its [`Container`]. Every mutation below keeps the two in step and is
//! all-or-nothing: values are checked before anything is written.
//!
//! A store is not synchronized. It is `Send`, so it can be handed to another
//! thread, but shared mutation needs an external lock.

use crate::config::StoreConfig;
use crate::list::ListView;
use crate::notify::{ChangeEvent, ChangeKind, ChangeListener, ListenerId, Notifier};
use crate::record::{Container, Record, Slot};
use crate::registry::Registry;
use crate::schema::{FeatureDescriptor, FeatureKind, RecordType};
use owsmodel_types::{FeatureId, ModelError, ModelResult, RecordId, RecordTypeId, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Addresses a feature of a record type: by id, by index or by name.
pub trait FeatureKey {
    fn lookup<'r>(&self, record_type: &'r RecordType) -> ModelResult<&'r FeatureDescriptor>;
}

impl FeatureKey for FeatureId {
    fn lookup<'r>(&self, record_type: &'r RecordType) -> ModelResult<&'r FeatureDescriptor> {
        self.index().lookup(record_type)
    }
}

impl FeatureKey for usize {
    fn lookup<'r>(&self, record_type: &'r RecordType) -> ModelResult<&'r FeatureDescriptor> {
        record_type
            .features()
            .get(*self)
            .ok_or_else(|| ModelError::IndexOutOfRange {
                target: record_type.name().to_owned(),
                index: *self,
                count: record_type.feature_count(),
            })
    }
}

impl FeatureKey for &str {
    fn lookup<'r>(&self, record_type: &'r RecordType) -> ModelResult<&'r FeatureDescriptor> {
        record_type
            .feature_named(self)
            .ok_or_else(|| ModelError::UnknownFeature {
                record_type: record_type.name().to_owned(),
                feature: (*self).to_owned(),
            })
    }
}

/// A descriptor resolves only against its declaring type or a subtype of it.
impl FeatureKey for &FeatureDescriptor {
    fn lookup<'r>(&self, record_type: &'r RecordType) -> ModelResult<&'r FeatureDescriptor> {
        record_type
            .features()
            .get(self.id().index())
            .filter(|f| f.declaring_type() == self.declaring_type() && f.name() == self.name())
            .ok_or_else(|| ModelError::UnknownFeature {
                record_type: record_type.name().to_owned(),
                feature: self.name().to_owned(),
            })
    }
}

pub(crate) fn label(rt: &RecordType, f: &FeatureDescriptor) -> String {
    format!("{}.{}", rt.name(), f.name())
}

/// Contained children held by `slot`, with the feature recorded as their container.
fn contained(rt: &RecordType, f: &FeatureDescriptor, slot: &Slot) -> Vec<(RecordId, FeatureId)> {
    match f.kind() {
        FeatureKind::Reference {
            containment: true, ..
        } => slot
            .items()
            .iter()
            .filter_map(Value::as_record)
            .map(|r| (r, f.id()))
            .collect(),
        FeatureKind::Group => slot
            .items()
            .iter()
            .filter_map(Value::as_entry)
            .filter(|e| {
                rt.features()
                    .get(e.feature.index())
                    .is_some_and(FeatureDescriptor::is_containment)
            })
            .filter_map(|e| e.value.as_record().map(|r| (r, e.feature)))
            .collect(),
        _ => Vec::new(),
    }
}

fn remap(value: &Value, ids: &HashMap<RecordId, RecordId>) -> Value {
    match value {
        Value::Record(r) => Value::Record(ids.get(r).copied().unwrap_or(*r)),
        Value::Entry(e) => Value::entry(e.feature, remap(&e.value, ids)),
        Value::List(items) => Value::List(items.iter().map(|v| remap(v, ids)).collect()),
        other => other.clone(),
    }
}

/// Arena of live records bound to one registry.
#[derive(Debug)]
pub struct RecordStore {
    registry: Arc<Registry>,
    config: StoreConfig,
    records: HashMap<RecordId, Record>,
    notifier: Notifier,
}

impl RecordStore {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, StoreConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: Arc<Registry>, config: StoreConfig) -> Self {
        Self {
            registry,
            config,
            records: HashMap::new(),
            notifier: Notifier::default(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `id` names a live record.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn record(&self, id: RecordId) -> ModelResult<&Record> {
        self.records.get(&id).ok_or(ModelError::UnknownRecord(id))
    }

    fn record_mut(&mut self, id: RecordId) -> ModelResult<&mut Record> {
        self.records.get_mut(&id).ok_or(ModelError::UnknownRecord(id))
    }

    pub fn record_type_of(&self, id: RecordId) -> ModelResult<&RecordType> {
        self.registry.record_type(self.record(id)?.record_type)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Records without a container, in creation order.
    #[must_use]
    pub fn roots(&self) -> Vec<RecordId> {
        let mut roots: Vec<_> = self
            .records
            .values()
            .filter(|r| r.container.is_none())
            .map(Record::id)
            .collect();
        roots.sort();
        roots
    }

    pub fn container(&self, id: RecordId) -> ModelResult<Option<Container>> {
        Ok(self.record(id)?.container)
    }

    /// Creates a record with every feature at its default and nothing set.
    pub fn create(&mut self, type_id: RecordTypeId) -> ModelResult<RecordId> {
        let rt = self.registry.record_type(type_id)?;
        if rt.is_abstract() {
            return Err(ModelError::UnsupportedOperation(format!(
                "cannot instantiate abstract type {}",
                self.registry.qualified_name(type_id)
            )));
        }
        let record = Record::new(rt);
        let id = record.id;
        trace!(record = %id, record_type = rt.name(), "Record created");
        self.records.insert(id, record);
        Ok(id)
    }

    // ── Reflective access ────────────────────────────────────────

    /// Current value of a feature. Many-valued features yield a
    /// [`Value::List`] snapshot; use [`Self::list`] for the live view.
    pub fn get<K: FeatureKey>(&self, id: RecordId, key: K) -> ModelResult<Value> {
        let record = self.record(id)?;
        let rt = self.registry.record_type(record.record_type)?;
        let f = key.lookup(rt)?;
        Ok(match f.group() {
            Some(group) => project(record, f, group),
            None => record.slots[f.id().index()].to_value(),
        })
    }

    /// Stores a value and publishes one [`ChangeKind::Set`] event.
    ///
    /// Assigning a record to a containment feature transfers it from its
    /// previous container; a record displaced from the slot is destroyed.
    pub fn set<K: FeatureKey>(&mut self, id: RecordId, key: K, value: impl Into<Value>) -> ModelResult<()> {
        let value = value.into();
        let registry = Arc::clone(&self.registry);
        let rt = registry.record_type(self.record(id)?.record_type)?;
        let f = key.lookup(rt)?;
        check_writable(rt, f)?;

        if let Some(group) = f.group() {
            return self.set_member(id, rt, f, group, value);
        }

        let was_set = self.record(id)?.explicitly_set[f.id().index()];
        let slot = if f.is_many() {
            let items = match value {
                Value::List(items) => items,
                Value::Null => Vec::new(),
                other => {
                    return Err(ModelError::type_mismatch(label(rt, f), "list", other.kind_name()));
                }
            };
            for item in &items {
                self.check_item(id, rt, f, item)?;
            }
            Slot::Many(items)
        } else {
            if !value.is_null() {
                self.check_item(id, rt, f, &value)?;
            }
            Slot::Single(value)
        };

        let new = slot.to_value();
        let old = self.rewrite_slot(id, rt, f, slot)?.to_value();
        self.record_mut(id)?.explicitly_set[f.id().index()] = true;
        trace!(record = %id, feature = f.name(), "Feature set");

        let touch = old == new && (was_set || !f.is_unsettable());
        self.publish(id, touch, || ChangeEvent {
            record: id,
            feature: f.id(),
            kind: ChangeKind::Set,
            old,
            new,
            position: None,
        });
        Ok(())
    }

    /// Returns a feature to its default and clears its set flag.
    ///
    /// Fails with [`ModelError::UnsupportedOperation`] unless the feature is
    /// unsettable. Contained records released by the reset are destroyed.
    pub fn unset<K: FeatureKey>(&mut self, id: RecordId, key: K) -> ModelResult<()> {
        let registry = Arc::clone(&self.registry);
        let rt = registry.record_type(self.record(id)?.record_type)?;
        let f = key.lookup(rt)?;
        check_writable(rt, f)?;
        if !f.is_unsettable() {
            return Err(ModelError::UnsupportedOperation(format!(
                "{} is not unsettable",
                label(rt, f)
            )));
        }

        let was_set = self.is_set(id, f)?;
        let (old, new) = match f.group() {
            Some(group) => {
                let record = self.record(id)?;
                let old = project(record, f, group);
                let kept: Vec<Value> = record.slots[group.index()]
                    .items()
                    .iter()
                    .filter(|v| v.as_entry().is_none_or(|e| e.feature != f.id()))
                    .cloned()
                    .collect();
                let group_f = group.lookup(rt)?;
                self.rewrite_slot(id, rt, group_f, Slot::Many(kept))?;
                (old, f.default_value().clone())
            }
            None => {
                let slot = if f.is_many() {
                    Slot::Many(Vec::new())
                } else {
                    Slot::Single(f.default_value().clone())
                };
                let new = slot.to_value();
                let old = self.rewrite_slot(id, rt, f, slot)?.to_value();
                self.record_mut(id)?.explicitly_set[f.id().index()] = false;
                (old, new)
            }
        };
        trace!(record = %id, feature = f.name(), "Feature unset");

        self.publish(id, !was_set, || ChangeEvent {
            record: id,
            feature: f.id(),
            kind: ChangeKind::Unset,
            old,
            new,
            position: None,
        });
        Ok(())
    }

    /// The unified set test: the explicit flag for unsettable single
    /// features, non-emptiness for lists and groups, non-default otherwise.
    pub fn is_set<K: FeatureKey>(&self, id: RecordId, key: K) -> ModelResult<bool> {
        let record = self.record(id)?;
        let rt = self.registry.record_type(record.record_type)?;
        let f = key.lookup(rt)?;
        Ok(match f.group() {
            Some(group) => has_entries(record, f, group),
            None if f.is_many() => !record.slots[f.id().index()].items().is_empty(),
            None if f.is_unsettable() => record.explicitly_set[f.id().index()],
            None => record.slots[f.id().index()].to_value() != *f.default_value(),
        })
    }

    /// Whether the feature was written since creation or the last `unset`.
    pub fn is_explicitly_set<K: FeatureKey>(&self, id: RecordId, key: K) -> ModelResult<bool> {
        let record = self.record(id)?;
        let rt = self.registry.record_type(record.record_type)?;
        let f = key.lookup(rt)?;
        Ok(match f.group() {
            Some(group) => has_entries(record, f, group),
            None => record.explicitly_set[f.id().index()],
        })
    }

    /// Whether the current value differs from the declared default.
    pub fn is_non_default<K: FeatureKey>(&self, id: RecordId, key: K) -> ModelResult<bool> {
        let record = self.record(id)?;
        let rt = self.registry.record_type(record.record_type)?;
        let f = key.lookup(rt)?;
        Ok(match f.group() {
            Some(group) => project(record, f, group) != *f.default_value(),
            None if f.is_many() => !record.slots[f.id().index()].items().is_empty(),
            None => record.slots[f.id().index()].to_value() != *f.default_value(),
        })
    }

    /// Live view over a many-valued feature. Mutations through the view
    /// mutate the record and publish events.
    pub fn list<K: FeatureKey>(&mut self, id: RecordId, key: K) -> ModelResult<ListView<'_>> {
        let registry = Arc::clone(&self.registry);
        let rt = registry.record_type(self.record(id)?.record_type)?;
        let f = key.lookup(rt)?;
        if !f.is_many() {
            return Err(ModelError::UnsupportedOperation(format!(
                "{} is not many-valued",
                label(rt, f)
            )));
        }
        if f.is_derived() {
            return Err(ModelError::UnsupportedOperation(format!(
                "{} is derived; use its group feature",
                label(rt, f)
            )));
        }
        Ok(ListView::new(self, id, rt.id(), f.id()))
    }

    /// The target of a single reference if it is still alive.
    pub fn resolve<K: FeatureKey>(&self, id: RecordId, key: K) -> ModelResult<Option<RecordId>> {
        let target = self.get(id, key)?;
        Ok(target.as_record().filter(|r| self.contains(*r)))
    }

    // ── Containment ──────────────────────────────────────────────

    /// Releases `id` from its container without destroying it.
    pub fn detach(&mut self, id: RecordId) -> ModelResult<()> {
        self.record(id)?;
        self.release(id)
    }

    /// Discards a record and everything it contains.
    pub fn destroy(&mut self, id: RecordId) -> ModelResult<()> {
        self.release(id)?;
        self.destroy_subtree(id);
        Ok(())
    }

    /// Records directly contained by `id`, in feature order.
    pub fn contents(&self, id: RecordId) -> ModelResult<Vec<RecordId>> {
        let record = self.record(id)?;
        let rt = self.registry.record_type(record.record_type)?;
        Ok(rt
            .features()
            .iter()
            .filter(|f| !f.is_derived())
            .flat_map(|f| contained(rt, f, &record.slots[f.id().index()]))
            .map(|(r, _)| r)
            .collect())
    }

    /// Every record transitively contained by `id`, pre-order, excluding `id`.
    pub fn all_contents(&self, id: RecordId) -> ModelResult<Vec<RecordId>> {
        let mut out = Vec::new();
        let mut stack = self.contents(id)?;
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children = self.contents(next)?;
            children.reverse();
            stack.extend(children);
        }
        Ok(out)
    }

    /// Deep-copies `id` and its contents into a new root record.
    ///
    /// References between records inside the copied subtree are redirected
    /// to the copies; references leaving it are kept as they are.
    pub fn copy(&mut self, id: RecordId) -> ModelResult<RecordId> {
        let mut subtree = vec![id];
        subtree.extend(self.all_contents(id)?);
        let ids: HashMap<RecordId, RecordId> = subtree.iter().map(|old| (*old, RecordId::new())).collect();

        let mut copies = Vec::with_capacity(subtree.len());
        for old in &subtree {
            let source = self.record(*old)?;
            let mut copy = source.clone();
            copy.id = ids[old];
            copy.container = if *old == id {
                None
            } else {
                source.container.map(|c| Container {
                    owner: ids.get(&c.owner).copied().unwrap_or(c.owner),
                    feature: c.feature,
                })
            };
            for slot in &mut copy.slots {
                *slot = match slot {
                    Slot::Single(v) => Slot::Single(remap(v, &ids)),
                    Slot::Many(items) => Slot::Many(items.iter().map(|v| remap(v, &ids)).collect()),
                };
            }
            copies.push(copy);
        }
        let root = ids[&id];
        trace!(source = %id, copy = %root, records = copies.len(), "Subtree copied");
        self.records.extend(copies.into_iter().map(|r| (r.id, r)));
        Ok(root)
    }

    // ── Listeners ────────────────────────────────────────────────

    /// Listens to every record in the store.
    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) -> ListenerId {
        self.notifier.subscribe(Box::new(listener))
    }

    /// Listens to one record. Dropped when the record is destroyed.
    pub fn subscribe_record(
        &mut self,
        id: RecordId,
        listener: impl ChangeListener + 'static,
    ) -> ModelResult<ListenerId> {
        self.record(id)?;
        Ok(self.notifier.subscribe_record(id, Box::new(listener)))
    }

    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        self.notifier.unsubscribe(listener)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    // ── Internals shared with ListView ───────────────────────────

    pub(crate) fn publish(&self, record: RecordId, touch: bool, build: impl FnOnce() -> ChangeEvent) {
        if touch && !self.config.notify_touch {
            return;
        }
        if self.notifier.is_listening(record) {
            self.notifier.publish(&build());
        }
    }

    pub(crate) fn items(&self, id: RecordId, feature: FeatureId) -> ModelResult<&[Value]> {
        Ok(self.record(id)?.slots[feature.index()].items())
    }

    /// Replaces the items of a many-valued feature and marks it set.
    /// Returns the previous items.
    pub(crate) fn replace_items(
        &mut self,
        id: RecordId,
        rt: &RecordType,
        f: &FeatureDescriptor,
        items: Vec<Value>,
    ) -> ModelResult<Vec<Value>> {
        let old = self.rewrite_slot(id, rt, f, Slot::Many(items))?;
        self.record_mut(id)?.explicitly_set[f.id().index()] = true;
        Ok(match old {
            Slot::Many(items) => items,
            Slot::Single(v) => vec![v],
        })
    }

    /// Checks one value (a single value or one list item) against `f`.
    pub(crate) fn check_item(
        &self,
        owner: RecordId,
        rt: &RecordType,
        f: &FeatureDescriptor,
        value: &Value,
    ) -> ModelResult<()> {
        match f.kind() {
            FeatureKind::Attribute { datatype } => {
                let dt = self.registry.datatype(datatype)?;
                if dt.conforms(value) {
                    Ok(())
                } else {
                    Err(ModelError::type_mismatch(label(rt, f), dt.name(), value.kind_name()))
                }
            }
            FeatureKind::Reference { target, containment } => {
                let Some(child) = value.as_record() else {
                    return Err(ModelError::type_mismatch(
                        label(rt, f),
                        self.registry.qualified_name(target),
                        value.kind_name(),
                    ));
                };
                let child_type = self.record(child)?.record_type;
                if !self.registry.is_subtype(child_type, target) {
                    return Err(ModelError::type_mismatch(
                        label(rt, f),
                        self.registry.qualified_name(target),
                        self.registry.qualified_name(child_type),
                    ));
                }
                if containment && self.is_self_or_container(child, owner) {
                    return Err(ModelError::ContainmentCycle { owner, child });
                }
                Ok(())
            }
            FeatureKind::Group => {
                let Some(entry) = value.as_entry() else {
                    return Err(ModelError::type_mismatch(label(rt, f), "entry", value.kind_name()));
                };
                let member = rt
                    .features()
                    .get(entry.feature.index())
                    .filter(|m| m.group() == Some(f.id()))
                    .ok_or_else(|| ModelError::UnknownFeature {
                        record_type: rt.name().to_owned(),
                        feature: entry.feature.to_string(),
                    })?;
                self.check_item(owner, rt, member, &entry.value)
            }
        }
    }

    /// Whether `candidate` is `of` or one of its (transitive) containers.
    fn is_self_or_container(&self, candidate: RecordId, of: RecordId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.records.get(&id).and_then(|r| r.container).map(|c| c.owner);
        }
        false
    }

    fn set_member(
        &mut self,
        id: RecordId,
        rt: &RecordType,
        f: &FeatureDescriptor,
        group: FeatureId,
        value: Value,
    ) -> ModelResult<()> {
        let group_f = group.lookup(rt)?;
        let record = self.record(id)?;
        let old = project(record, f, group);
        let entries = record.slots[group.index()].items().to_vec();

        let is_member = |v: &Value| v.as_entry().is_some_and(|e| e.feature == f.id());
        let updated = if f.is_many() {
            let values = match value {
                Value::List(values) => values,
                Value::Null => Vec::new(),
                other => {
                    return Err(ModelError::type_mismatch(label(rt, f), "list", other.kind_name()));
                }
            };
            for v in &values {
                self.check_item(id, rt, f, v)?;
            }
            // New entries take the place of the first old one.
            let at = entries.iter().position(is_member).unwrap_or(entries.len());
            let mut kept: Vec<Value> = entries.into_iter().filter(|v| !is_member(v)).collect();
            let tail = kept.split_off(at.min(kept.len()));
            kept.extend(values.into_iter().map(|v| Value::entry(f.id(), v)));
            kept.extend(tail);
            kept
        } else {
            let mut entries = entries;
            match (entries.iter().position(is_member), value) {
                (Some(pos), Value::Null) => {
                    entries.remove(pos);
                }
                (None, Value::Null) => {}
                (pos, value) => {
                    self.check_item(id, rt, f, &value)?;
                    let entry = Value::entry(f.id(), value);
                    match pos {
                        Some(pos) => entries[pos] = entry,
                        None => entries.push(entry),
                    }
                }
            }
            entries
        };

        self.rewrite_slot(id, rt, group_f, Slot::Many(updated))?;
        let new = project(self.record(id)?, f, group);
        trace!(record = %id, feature = f.name(), group = group_f.name(), "Group member set");

        let touch = old == new;
        self.publish(id, touch, || ChangeEvent {
            record: id,
            feature: f.id(),
            kind: ChangeKind::Set,
            old,
            new,
            position: None,
        });
        Ok(())
    }

    /// Writes `new` into the slot of `f`, moving contained children in and
    /// destroying the ones released. Returns the previous slot.
    ///
    /// Callers have checked every value; this only rejects a record listed
    /// twice in one containment slot.
    fn rewrite_slot(
        &mut self,
        owner: RecordId,
        rt: &RecordType,
        f: &FeatureDescriptor,
        new: Slot,
    ) -> ModelResult<Slot> {
        let index = f.id().index();
        let incoming = contained(rt, f, &new);
        let mut seen = HashSet::with_capacity(incoming.len());
        if let Some((dup, _)) = incoming.iter().find(|(r, _)| !seen.insert(*r)) {
            return Err(ModelError::UnsupportedOperation(format!(
                "record {dup} appears twice in {}",
                label(rt, f)
            )));
        }
        let outgoing: HashSet<RecordId> = contained(rt, f, &self.record(owner)?.slots[index])
            .into_iter()
            .map(|(r, _)| r)
            .collect();

        // Inverse remove before inverse add.
        for (child, _) in &incoming {
            if !outgoing.contains(child) {
                self.release(*child)?;
            }
        }

        let old = std::mem::replace(&mut self.record_mut(owner)?.slots[index], new);

        for (child, feature) in &incoming {
            self.record_mut(*child)?.container = Some(Container {
                owner,
                feature: *feature,
            });
        }
        let kept: HashSet<RecordId> = incoming.iter().map(|(r, _)| *r).collect();
        for released in outgoing.difference(&kept) {
            trace!(owner = %owner, record = %released, "Released contained record destroyed");
            self.destroy_subtree(*released);
        }
        Ok(old)
    }

    /// Removes `child` from its container's slot, publishing the change on
    /// the container. No-op for roots.
    fn release(&mut self, child: RecordId) -> ModelResult<()> {
        let Some(c) = self.record(child)?.container else {
            return Ok(());
        };
        let registry = Arc::clone(&self.registry);
        let rt = registry.record_type(self.record(c.owner)?.record_type)?;
        let member = c.feature.lookup(rt)?;
        let slot_feature = member.group().unwrap_or(member.id());

        let owner = self.record_mut(c.owner)?;
        let event = match &mut owner.slots[slot_feature.index()] {
            Slot::Single(v) => {
                let old = std::mem::take(v);
                owner.explicitly_set[slot_feature.index()] = false;
                ChangeEvent {
                    record: c.owner,
                    feature: slot_feature,
                    kind: ChangeKind::Unset,
                    old,
                    new: Value::Null,
                    position: None,
                }
            }
            Slot::Many(items) => {
                let position = items
                    .iter()
                    .position(|v| match v {
                        Value::Record(r) => *r == child,
                        Value::Entry(e) => e.value.as_record() == Some(child),
                        _ => false,
                    })
                    .ok_or(ModelError::UnknownRecord(child))?;
                let old = items.remove(position);
                ChangeEvent {
                    record: c.owner,
                    feature: slot_feature,
                    kind: ChangeKind::Remove,
                    old,
                    new: Value::Null,
                    position: Some(position),
                }
            }
        };
        self.record_mut(child)?.container = None;
        trace!(owner = %c.owner, record = %child, "Contained record released");
        self.publish(c.owner, false, || event);
        Ok(())
    }

    fn destroy_subtree(&mut self, root: RecordId) {
        let registry = Arc::clone(&self.registry);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(record) = self.records.remove(&id) else {
                continue;
            };
            if let Ok(rt) = registry.record_type(record.record_type) {
                for f in rt.features().iter().filter(|f| !f.is_derived()) {
                    stack.extend(contained(rt, f, &record.slots[f.id().index()]).into_iter().map(|(r, _)| r));
                }
            }
            self.notifier.forget_record(id);
            trace!(record = %id, "Record destroyed");
        }
    }
}

fn check_writable(rt: &RecordType, f: &FeatureDescriptor) -> ModelResult<()> {
    if !f.is_changeable() {
        return Err(ModelError::UnsupportedOperation(format!(
            "{} is not changeable",
            label(rt, f)
        )));
    }
    if f.is_derived() && f.group().is_none() {
        return Err(ModelError::UnsupportedOperation(format!(
            "{} is derived",
            label(rt, f)
        )));
    }
    Ok(())
}

/// The value of a group member: its first entry (or the default) for a
/// single member, all its entries for a many-valued one.
fn project(record: &Record, f: &FeatureDescriptor, group: FeatureId) -> Value {
    let mut values = record.slots[group.index()]
        .items()
        .iter()
        .filter_map(Value::as_entry)
        .filter(|e| e.feature == f.id())
        .map(|e| e.value.clone());
    if f.is_many() {
        Value::List(values.collect())
    } else {
        values.next().unwrap_or_else(|| f.default_value().clone())
    }
}

fn has_entries(record: &Record, f: &FeatureDescriptor, group: FeatureId) -> bool {
    record.slots[group.index()]
        .items()
        .iter()
        .filter_map(Value::as_entry)
        .any(|e| e.feature == f.id())
}
