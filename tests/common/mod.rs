//! Shared test fixtures: the counter and multiplier slices and a call recorder.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use slicestore::{
    combine_reducers, create_slice, create_store, CombinedReducer, Handlers, ReducerMap, Slice,
    Store,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub value: i64,
}

pub fn counter_slice() -> Slice<Counter> {
    create_slice(
        "counter",
        Counter { value: 0 },
        Handlers::new()
            .on("increment", |s: &mut Counter, (): ()| s.value += 1)
            .on("add", |s: &mut Counter, amount: i64| s.value += amount),
    )
    .expect("counter slice")
}

pub fn multiplier_slice() -> Slice<Multiplier> {
    create_slice(
        "multiplier",
        Multiplier { value: 1 },
        Handlers::new().on("multiply", |s: &mut Multiplier, by: i64| s.value *= by),
    )
    .expect("multiplier slice")
}

/// `{ counter, multiplier }` store plus the slices that built it.
pub fn composed_store() -> (Store<CombinedReducer>, Slice<Counter>, Slice<Multiplier>) {
    let counter = counter_slice();
    let multiplier = multiplier_slice();
    let root = combine_reducers(ReducerMap::new().slice(&counter).slice(&multiplier))
        .expect("combine");
    let store = create_store(root, None).expect("store");
    (store, counter, multiplier)
}

/// Records labels in call order.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self, label: &str) -> impl Fn() + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        move || calls.lock().push(label.clone())
    }

    pub fn push(&self, label: impl Into<String>) {
        self.calls.lock().push(label.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == label).count()
    }
}
