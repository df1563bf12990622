//! State values and the composed root state tree.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Anything that can live in the state tree.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Comparable (PartialEq for detecting changes)
/// - Plain data (Serialize, so inspectors can dump the tree)
pub trait StateValue: Clone + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static {}

impl<T> StateValue for T where T: Clone + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static {}

trait ErasedValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn to_json(&self) -> Result<Value, serde_json::Error>;
    fn eq_value(&self, other: &dyn ErasedValue) -> bool;
}

impl<T: StateValue> ErasedValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn eq_value(&self, other: &dyn ErasedValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// A type-erased sub-state. Cloning shares the allocation.
#[derive(Clone)]
pub struct SharedState(Arc<dyn ErasedValue>);

impl SharedState {
    pub fn new<T: StateValue>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// Typed view of the same allocation, so `Arc::ptr_eq` against the
    /// result still reflects identity.
    pub fn downcast<T: StateValue>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).into_any().downcast::<T>().ok()
    }

    pub fn is<T: StateValue>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn ptr_eq(&self, other: &SharedState) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        self.0.to_json()
    }
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for SharedState {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.eq_value(other.0.as_ref())
    }
}

/// Mapping from slice name to that slice's sub-state, in composition order.
///
/// Keys are fixed once a composer produced the tree; transitions only swap
/// the references stored under them.
#[derive(Clone, Default)]
pub struct RootState {
    slots: Vec<(String, SharedState)>,
}

impl RootState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a region. Used to build preloaded state.
    pub fn with<T: StateValue>(self, name: impl Into<String>, value: T) -> Self {
        self.with_shared(name, SharedState::new(Arc::new(value)))
    }

    pub fn with_shared(mut self, name: impl Into<String>, slot: SharedState) -> Self {
        let name = name.into();
        match self.slots.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = slot,
            None => self.slots.push((name, slot)),
        }
        self
    }

    pub(crate) fn from_slots(slots: Vec<(String, SharedState)>) -> Self {
        Self { slots }
    }

    pub fn get<T: StateValue>(&self, name: &str) -> Option<Arc<T>> {
        self.slot(name).and_then(SharedState::downcast)
    }

    pub fn slot(&self, name: &str) -> Option<&SharedState> {
        self.slots
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, slot)| slot)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SharedState)> {
        self.slots.iter().map(|(key, slot)| (key.as_str(), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl fmt::Debug for RootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for RootState {
    fn eq(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|((a_key, a), (b_key, b))| a_key == b_key && a == b)
    }
}

impl Serialize for RootState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (key, slot) in &self.slots {
            let value = slot.to_json().map_err(S::Error::custom)?;
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}
