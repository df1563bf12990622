//! slicestore: a deterministic state container.
//!
//! State lives in one tree owned by a [`Store`]. It changes only when an
//! [`Action`] is dispatched through pure reducers, typically slices
//! compiled with [`create_slice`] and merged with [`combine_reducers`].
//!
//! ```
//! use slicestore::{create_slice, create_store, Handlers};
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! let slice = create_slice(
//!     "counter",
//!     Counter { value: 0 },
//!     Handlers::new().on("increment", |s: &mut Counter, (): ()| s.value += 1),
//! )
//! .unwrap();
//! let store = create_store(slice.reducer.clone(), None).unwrap();
//! store.dispatch(slice.actions.get("increment").unwrap().create()).unwrap();
//! assert_eq!(store.read().value, 1);
//! ```

pub mod config;
pub mod demo;
pub mod engine;
pub mod logging;

pub use config::{Config, ConfigError, NotifyPolicy, StoreConfig};
pub use engine::{
    combine_reducers, create_slice, create_store, intent_reducer, reducer_fn, Action,
    ActionCreators, ActionDescriptor, ActionType, CombinedReducer, ConfigurationError,
    DispatchRecord, Handlers, Intent, IntentReducer, Listener, Reducer, ReducerMap, RootState,
    SharedState, Slice, SliceReducer, StateValue, Store, StoreError, Subscription,
    TransitionError,
};
