//! Error taxonomy for the state engine.

use thiserror::Error;

use super::action::ActionType;

/// Raised while building slices, composers or stores. Always fatal: the
/// component being constructed does not exist afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Slice name '{name}' is invalid: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Slice '{slice}' registers handler '{key}' more than once")]
    DuplicateHandler { slice: String, key: String },

    #[error("Handler key in slice '{slice}' must not be empty")]
    EmptyHandlerKey { slice: String },

    #[error("Reducer '{name}' is composed more than once")]
    DuplicateReducer { name: String },

    #[error("Action type '{action_type}' is owned by both '{first}' and '{second}'")]
    ActionTypeCollision {
        action_type: ActionType,
        first: String,
        second: String,
    },

    #[error("Cannot combine an empty set of reducers")]
    EmptyComposition,

    #[error("Preloaded state does not match the composed reducers: {message}")]
    IncompatibleState { message: String },

    #[error("Store history_limit {limit} exceeds the maximum of {max}")]
    HistoryLimitTooLarge { limit: usize, max: usize },
}

/// Raised by a transition function while computing the next state.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Payload for '{action_type}' could not be decoded: {source}")]
    Payload {
        action_type: ActionType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Action '{action_type}' was rejected: {reason}")]
    Rejected {
        action_type: ActionType,
        reason: String,
    },

    #[error("State held for '{slice}' has an unexpected type")]
    StateMismatch { slice: String },
}

impl TransitionError {
    /// Shorthand used by fallible handlers to refuse an action.
    pub fn rejected(action_type: &ActionType, reason: impl Into<String>) -> Self {
        Self::Rejected {
            action_type: action_type.clone(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by store construction and [`Store::dispatch`](super::Store::dispatch).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Store '{store}' is already dispatching; reducers and listeners must not dispatch")]
    Reentrancy { store: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Payload could not be serialized: {0}")]
    Payload(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_reentrancy(&self) -> bool {
        matches!(self, Self::Reentrancy { .. })
    }
}
