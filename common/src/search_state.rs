//! The filter state of one search session and the store that owns it.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::filter_codec::FilterValue;

/// Field name -> current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchState {
    fields: BTreeMap<String, FilterValue>,
}

impl SearchState {
    pub fn get(&self, field_name: &str) -> Option<&FilterValue> {
        self.fields.get(field_name)
    }

    pub fn insert(&mut self, field_name: impl Into<String>, value: FilterValue) {
        self.fields.insert(field_name.into(), value);
    }

    pub fn remove(&mut self, field_name: &str) -> Option<FilterValue> {
        self.fields.remove(field_name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.fields.iter()
    }
}

impl FromIterator<(String, FilterValue)> for SearchState {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&SearchState)>;

#[derive(Default)]
struct StoreInner {
    state: SearchState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
    hydration_settled: bool,
}

/// Single-owner store for a session's [`SearchState`].
///
/// Cloning the handle shares the state. Listeners run after every mutation,
/// with the store already released, so they may read it again.
#[derive(Clone, Default)]
pub struct SearchStateStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl SearchStateStore {
    pub fn new(initial: SearchState) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().state = initial;
        store
    }

    pub fn get(&self) -> SearchState {
        self.inner.borrow().state.clone()
    }

    pub fn get_field(&self, field_name: &str) -> Option<FilterValue> {
        self.inner.borrow().state.get(field_name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().state.is_empty()
    }

    pub fn set(&self, state: SearchState) {
        self.mutate(|s| *s = state);
    }

    /// Blank values remove the field.
    pub fn set_field(&self, field_name: &str, value: FilterValue) {
        if value.is_blank() {
            self.remove_field(field_name);
            return;
        }
        self.mutate(|s| s.insert(field_name, value));
    }

    pub fn remove_field(&self, field_name: &str) {
        self.mutate(|s| {
            s.remove(field_name);
        });
    }

    pub fn clear(&self) {
        self.mutate(|s| *s = SearchState::default());
    }

    /// Marks the saved-search restore as done for this session. Returns
    /// whether it already was. Clearing the state does not undo it.
    pub fn settle_hydration(&self) -> bool {
        std::mem::replace(&mut self.inner.borrow_mut().hydration_settled, true)
    }

    pub fn is_hydration_settled(&self) -> bool {
        self.inner.borrow().hydration_settled
    }

    pub fn subscribe(&self, listener: impl Fn(&SearchState) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.borrow_mut().listeners.retain(|(other, _)| *other != id);
    }

    fn mutate(&self, f: impl FnOnce(&mut SearchState)) {
        let (snapshot, listeners) = {
            let mut inner = self.inner.borrow_mut();
            f(&mut inner.state);
            let listeners: Vec<Listener> = inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (inner.state.clone(), listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn set_field_and_blank_removal() {
        let store = SearchStateStore::default();
        store.set_field("stage", FilterValue::Single("Won".into()));
        assert_eq!(store.get_field("stage"), Some(FilterValue::Single("Won".into())));
        store.set_field("stage", FilterValue::Multi(vec![]));
        assert!(store.is_empty());
    }

    #[test]
    fn listeners_see_every_mutation_and_can_read_back() {
        let store = SearchStateStore::default();
        let seen = Rc::new(Cell::new(0));
        let reader = store.clone();
        let counter = seen.clone();
        let id = store.subscribe(move |state| {
            assert_eq!(reader.get().len(), state.len());
            counter.set(counter.get() + 1);
        });
        store.set_field("a", FilterValue::Single("1".into()));
        store.set_field("b", FilterValue::Single("2".into()));
        store.clear();
        assert_eq!(seen.get(), 3);

        store.unsubscribe(id);
        store.set_field("a", FilterValue::Single("1".into()));
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn hydration_stays_settled_across_clear() {
        let store = SearchStateStore::default();
        assert!(!store.settle_hydration());
        store.clear();
        assert!(store.clone().settle_hydration());
        assert!(store.is_hydration_settled());
    }

    #[test]
    fn clones_share_state() {
        let store = SearchStateStore::new([("a".to_string(), FilterValue::Single("1".into()))].into_iter().collect());
        let other = store.clone();
        other.remove_field("a");
        assert!(store.is_empty());
    }
}
