//! Reducer traits and the adapters for hand-written transition functions.

use std::sync::Arc;

use super::action::{Action, ActionType, Intent};
use super::error::{ConfigurationError, TransitionError};
use super::state::StateValue;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> State. An action it does
/// not recognize must come back as the very same `Arc`, never as an error.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: StateValue;

    /// The value used when there is no current state yet.
    fn initial_state(&self) -> Arc<Self::State>;

    /// Process an action and return the next state.
    fn reduce(
        &self,
        state: &Arc<Self::State>,
        action: &Action,
    ) -> Result<Arc<Self::State>, TransitionError>;

    /// Compiled action types owned by this reducer.
    fn action_types(&self) -> Vec<ActionType> {
        Vec::new()
    }

    /// Checks that externally supplied state fits this reducer.
    fn validate(&self, _state: &Self::State) -> Result<(), ConfigurationError> {
        Ok(())
    }
}

/// Reducer over a plain closure. `Ok(None)` from the closure means "not mine"
/// and keeps the current reference; an `Err` aborts the dispatch.
pub struct FnReducer<S, F> {
    initial: Arc<S>,
    reduce: F,
}

pub fn reducer_fn<S, F>(initial: S, reduce: F) -> FnReducer<S, F>
where
    S: StateValue,
    F: Fn(&S, &Action) -> Result<Option<S>, TransitionError> + Send + Sync + 'static,
{
    FnReducer {
        initial: Arc::new(initial),
        reduce,
    }
}

impl<S, F> Reducer for FnReducer<S, F>
where
    S: StateValue,
    F: Fn(&S, &Action) -> Result<Option<S>, TransitionError> + Send + Sync + 'static,
{
    type State = S;

    fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.initial)
    }

    fn reduce(&self, state: &Arc<S>, action: &Action) -> Result<Arc<S>, TransitionError> {
        Ok(match (self.reduce)(state, action)? {
            Some(next) => Arc::new(next),
            None => Arc::clone(state),
        })
    }
}

/// Reducer that matches over a closed [`Intent`] enum.
pub trait IntentReducer: Send + Sync + 'static {
    type State: StateValue;
    type Intent: Intent;

    fn initial_state(&self) -> Self::State;

    /// `None` leaves the state untouched.
    fn reduce(&self, state: &Self::State, intent: Self::Intent) -> Option<Self::State>;
}

/// Adapts an [`IntentReducer`] to the action-level [`Reducer`] contract.
pub struct IntentAdapter<R: IntentReducer> {
    inner: R,
    initial: Arc<<R as IntentReducer>::State>,
}

pub fn intent_reducer<R: IntentReducer>(inner: R) -> IntentAdapter<R> {
    let initial = Arc::new(inner.initial_state());
    IntentAdapter { inner, initial }
}

impl<R: IntentReducer> Reducer for IntentAdapter<R> {
    type State = R::State;

    fn initial_state(&self) -> Arc<R::State> {
        Arc::clone(&self.initial)
    }

    fn reduce(
        &self,
        state: &Arc<R::State>,
        action: &Action,
    ) -> Result<Arc<R::State>, TransitionError> {
        let Some(intent) = R::Intent::from_action(action)? else {
            return Ok(Arc::clone(state));
        };
        Ok(match self.inner.reduce(state, intent) {
            Some(next) => Arc::new(next),
            None => Arc::clone(state),
        })
    }

    fn action_types(&self) -> Vec<ActionType> {
        R::Intent::action_types()
    }
}
