//! Change Notifier: synchronous, in-process delivery of [`ChangeEvent`]s.
//!
//! Listeners run inline on the mutating thread, after the mutation is
//! committed. A listener cannot fail; if it panics, the panic unwinds to the
//! caller of the mutating operation with the store already in its post-state.

use owsmodel_types::{FeatureId, RecordId, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of mutation an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A single value (or a list item at `position`) was replaced.
    Set,
    /// The feature was returned to its default.
    Unset,
    /// One item was inserted at `position`.
    Add,
    /// One item was removed from `position`.
    Remove,
    /// Several items were removed at once; `old` holds them all.
    RemoveMany,
}

/// Immutable snapshot of one completed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub record: RecordId,
    pub feature: FeatureId,
    pub kind: ChangeKind,
    pub old: Value,
    pub new: Value,
    /// List position for item-level events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl ChangeEvent {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.kind == ChangeKind::Unset
    }

    /// A `Set` that left the value as it was.
    #[must_use]
    pub fn is_touch(&self) -> bool {
        self.kind == ChangeKind::Set && self.old == self.new
    }
}

/// Receives change events.
pub trait ChangeListener: Send {
    fn notify(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send,
{
    fn notify(&self, event: &ChangeEvent) {
        self(event);
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct Notifier {
    next_id: u64,
    global: Vec<(ListenerId, Box<dyn ChangeListener>)>,
    per_record: HashMap<RecordId, Vec<(ListenerId, Box<dyn ChangeListener>)>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("global", &self.global.len())
            .field("per_record", &self.per_record.len())
            .finish()
    }
}

impl Notifier {
    fn next(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    pub(crate) fn subscribe(&mut self, listener: Box<dyn ChangeListener>) -> ListenerId {
        let id = self.next();
        self.global.push((id, listener));
        id
    }

    pub(crate) fn subscribe_record(
        &mut self,
        record: RecordId,
        listener: Box<dyn ChangeListener>,
    ) -> ListenerId {
        let id = self.next();
        self.per_record.entry(record).or_default().push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        if let Some(pos) = self.global.iter().position(|(lid, _)| *lid == id) {
            self.global.remove(pos);
            return true;
        }
        for listeners in self.per_record.values_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    /// Drops the listeners of a destroyed record.
    pub(crate) fn forget_record(&mut self, record: RecordId) {
        self.per_record.remove(&record);
    }

    pub(crate) fn is_listening(&self, record: RecordId) -> bool {
        !self.global.is_empty() || self.per_record.get(&record).is_some_and(|l| !l.is_empty())
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.global.len() + self.per_record.values().map(Vec::len).sum::<usize>()
    }

    /// Delivers to the record's own listeners, then to store-wide ones.
    pub(crate) fn publish(&self, event: &ChangeEvent) {
        if let Some(listeners) = self.per_record.get(&event.record) {
            for (_, l) in listeners {
                l.notify(event);
            }
        }
        for (_, l) in &self.global {
            l.notify(event);
        }
    }
}
