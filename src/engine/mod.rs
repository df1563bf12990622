//! Deterministic state container.
//!
//! # Architecture
//!
//! ```text
//! Slice ──→ SliceReducer ─┐
//! Slice ──→ SliceReducer ─┼─→ combine_reducers ──→ CombinedReducer ──→ Store
//! fn / Intent reducer ────┘                                             │
//!        ▲                                                              │
//!        └──── dispatch(Action) ◄── collaborators ──► subscribe ◄───────┘
//! ```
//!
//! - **State**: immutable values behind `Arc`; identity means "unchanged"
//! - **Action**: `{ type, payload? }` requests
//! - **Reducer**: pure function that transforms state based on actions
//! - **Store**: owns the root state, serializes dispatches, notifies listeners
//!
//! # Invariants
//!
//! 1. An action no reducer recognizes leaves `read()` pointing at the same
//!    allocation.
//! 2. After a partial update, untouched regions keep their references.
//! 3. Listeners run in registration order over a snapshot taken before the
//!    first one runs.
//! 4. A dispatch issued while another is running fails with
//!    [`StoreError::Reentrancy`] and changes nothing.

mod action;
mod combine;
mod error;
mod reducer;
mod slice;
mod state;
mod store;
mod subscribers;

pub use action::{Action, ActionType, Intent, INIT_ACTION_TYPE};
pub use combine::{combine_reducers, CombinedReducer, ReducerMap};
pub use error::{ConfigurationError, StoreError, TransitionError};
pub use reducer::{intent_reducer, reducer_fn, FnReducer, IntentAdapter, IntentReducer, Reducer};
pub use slice::{create_slice, ActionCreators, ActionDescriptor, Handlers, Slice, SliceReducer};
pub use state::{RootState, SharedState, StateValue};
pub use store::{create_store, DispatchRecord, Store};
pub use subscribers::{Listener, ListenerId, Subscription};
