//! Unscoped counter driven by plain `increment` / `decrement` actions.

use serde::{Deserialize, Serialize};

use crate::engine::{Action, ActionType, Intent, IntentReducer, TransitionError};

pub const INCREMENT: &str = "increment";
pub const DECREMENT: &str = "decrement";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterState {
    pub counter: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterIntent {
    Increment,
    Decrement,
}

impl Intent for CounterIntent {
    fn from_action(action: &Action) -> Result<Option<Self>, TransitionError> {
        Ok(match action.action_type().as_str() {
            INCREMENT => Some(Self::Increment),
            DECREMENT => Some(Self::Decrement),
            _ => None,
        })
    }

    fn action_types() -> Vec<ActionType> {
        vec![INCREMENT.into(), DECREMENT.into()]
    }
}

pub struct CounterReducer;

impl IntentReducer for CounterReducer {
    type State = CounterState;
    type Intent = CounterIntent;

    fn initial_state(&self) -> CounterState {
        CounterState::default()
    }

    fn reduce(&self, state: &CounterState, intent: CounterIntent) -> Option<CounterState> {
        let counter = match intent {
            CounterIntent::Increment => state.counter.saturating_add(1),
            CounterIntent::Decrement => state.counter.saturating_sub(1),
        };
        Some(CounterState { counter })
    }
}
