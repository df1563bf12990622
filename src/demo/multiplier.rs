use serde::{Deserialize, Serialize};

use crate::engine::{create_slice, ConfigurationError, Handlers, Slice};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierState {
    pub value: i64,
}

impl Default for MultiplierState {
    fn default() -> Self {
        Self { value: 1 }
    }
}

/// `multiplier/multiply` with an integer payload.
pub fn multiplier_slice() -> Result<Slice<MultiplierState>, ConfigurationError> {
    create_slice(
        "multiplier",
        MultiplierState::default(),
        Handlers::new().on("multiply", |state: &mut MultiplierState, by: i64| {
            state.value = state.value.saturating_mul(by);
        }),
    )
}
