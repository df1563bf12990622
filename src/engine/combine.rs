//! Composer: many region reducers merged into one root reducer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::action::{Action, ActionType};
use super::error::{ConfigurationError, TransitionError};
use super::reducer::Reducer;
use super::slice::{validate_name, Slice};
use super::state::{RootState, SharedState, StateValue};

/// Object-safe view of a [`Reducer`] operating on erased sub-states.
trait Member: Send + Sync {
    fn initial_slot(&self) -> SharedState;
    fn reduce_slot(
        &self,
        name: &str,
        slot: &SharedState,
        action: &Action,
    ) -> Result<SharedState, TransitionError>;
    fn owned_types(&self) -> Vec<ActionType>;
    fn validate_slot(&self, name: &str, slot: &SharedState) -> Result<(), ConfigurationError>;
}

impl<R: Reducer> Member for R {
    fn initial_slot(&self) -> SharedState {
        SharedState::new(self.initial_state())
    }

    fn reduce_slot(
        &self,
        name: &str,
        slot: &SharedState,
        action: &Action,
    ) -> Result<SharedState, TransitionError> {
        let current = slot
            .downcast::<R::State>()
            .ok_or_else(|| TransitionError::StateMismatch {
                slice: name.to_string(),
            })?;
        let next = self.reduce(&current, action)?;
        if Arc::ptr_eq(&current, &next) {
            Ok(slot.clone())
        } else {
            Ok(SharedState::new(next))
        }
    }

    fn owned_types(&self) -> Vec<ActionType> {
        self.action_types()
    }

    fn validate_slot(&self, name: &str, slot: &SharedState) -> Result<(), ConfigurationError> {
        let state = slot
            .downcast::<R::State>()
            .ok_or_else(|| ConfigurationError::IncompatibleState {
                message: format!("region '{name}' holds a value of the wrong type"),
            })?;
        self.validate(&state)
    }
}

/// Named reducers waiting to be combined, in insertion order.
#[derive(Default)]
pub struct ReducerMap {
    members: Vec<(String, Box<dyn Member>)>,
}

impl ReducerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<R: Reducer>(mut self, name: impl Into<String>, reducer: R) -> Self {
        self.members.push((name.into(), Box::new(reducer)));
        self
    }

    /// Inserts a slice's reducer under the slice's own name.
    pub fn slice<S: StateValue>(self, slice: &Slice<S>) -> Self {
        let name = slice.name().to_string();
        self.insert(name, slice.reducer.clone())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Root reducer produced by [`combine_reducers`].
///
/// Regions never observe each other's transition within one dispatch.
/// Unchanged regions keep their references in the next root.
pub struct CombinedReducer {
    members: Vec<(String, Box<dyn Member>)>,
    initial: Arc<RootState>,
}

impl CombinedReducer {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for CombinedReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Reducer for CombinedReducer {
    type State = RootState;

    fn initial_state(&self) -> Arc<RootState> {
        Arc::clone(&self.initial)
    }

    fn reduce(
        &self,
        state: &Arc<RootState>,
        action: &Action,
    ) -> Result<Arc<RootState>, TransitionError> {
        let mut changed = false;
        let mut slots = Vec::with_capacity(self.members.len());

        for (name, member) in &self.members {
            let previous = state
                .slot(name)
                .ok_or_else(|| TransitionError::StateMismatch {
                    slice: name.clone(),
                })?;
            let next = member.reduce_slot(name, previous, action)?;
            changed |= !next.ptr_eq(previous);
            slots.push((name.clone(), next));
        }

        if !changed {
            return Ok(Arc::clone(state));
        }
        Ok(Arc::new(RootState::from_slots(slots)))
    }

    fn action_types(&self) -> Vec<ActionType> {
        self.members
            .iter()
            .flat_map(|(_, member)| member.owned_types())
            .collect()
    }

    fn validate(&self, state: &RootState) -> Result<(), ConfigurationError> {
        if state.len() != self.members.len() {
            return Err(ConfigurationError::IncompatibleState {
                message: format!(
                    "expected regions [{}], got [{}]",
                    self.names().collect::<Vec<_>>().join(", "),
                    state.keys().collect::<Vec<_>>().join(", ")
                ),
            });
        }
        for (name, member) in &self.members {
            let slot = state
                .slot(name)
                .ok_or_else(|| ConfigurationError::IncompatibleState {
                    message: format!("region '{name}' is missing"),
                })?;
            member.validate_slot(name, slot)?;
        }
        Ok(())
    }
}

/// Merges named reducers into one root reducer.
///
/// # Errors
/// Fails on an empty map, an invalid or repeated name, or two members
/// owning the same compiled action type.
pub fn combine_reducers(map: ReducerMap) -> Result<CombinedReducer, ConfigurationError> {
    if map.is_empty() {
        return Err(ConfigurationError::EmptyComposition);
    }

    let mut owners: HashMap<ActionType, &str> = HashMap::new();
    for (index, (name, member)) in map.members.iter().enumerate() {
        validate_name(name)?;
        if map.members[..index].iter().any(|(other, _)| other == name) {
            return Err(ConfigurationError::DuplicateReducer { name: name.clone() });
        }
        for action_type in member.owned_types() {
            if let Some(first) = owners.get(&action_type) {
                return Err(ConfigurationError::ActionTypeCollision {
                    action_type,
                    first: first.to_string(),
                    second: name.clone(),
                });
            }
            owners.insert(action_type, name);
        }
    }

    let initial = RootState::from_slots(
        map.members
            .iter()
            .map(|(name, member)| (name.clone(), member.initial_slot()))
            .collect(),
    );

    tracing::debug!(regions = map.members.len(), "Reducers combined");

    Ok(CombinedReducer {
        members: map.members,
        initial: Arc::new(initial),
    })
}
