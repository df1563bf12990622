//! Demo regions used by the `slicestore` binary: a counter driven by
//! unscoped actions, a multiplier slice and a todo list.

mod counter;
mod multiplier;
mod todos;

pub use counter::{CounterIntent, CounterReducer, CounterState, DECREMENT, INCREMENT};
pub use multiplier::{multiplier_slice, MultiplierState};
pub use todos::{todos_reducer, TodosState, ADD_TODO, REMOVE_TODO};

use crate::config::StoreConfig;
use crate::engine::{
    combine_reducers, intent_reducer, CombinedReducer, ReducerMap, Store, StoreError,
};

/// `{ counter, multiplier, todos }` composed into one store.
pub fn demo_store(config: StoreConfig) -> Result<Store<CombinedReducer>, StoreError> {
    let multiplier = multiplier_slice()?;
    let root = combine_reducers(
        ReducerMap::new()
            .insert("counter", intent_reducer(CounterReducer))
            .slice(&multiplier)
            .insert("todos", todos_reducer()),
    )?;
    Store::with_config(root, None, config)
}
