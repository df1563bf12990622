//! Slice compiler: named sub-state plus handlers, compiled into a reducer
//! and a set of action descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::action::{Action, ActionType};
use super::error::{ConfigurationError, StoreError, TransitionError};
use super::reducer::Reducer;
use super::state::StateValue;

type HandlerFn<S> = Arc<dyn Fn(&mut S, &Action) -> Result<(), TransitionError> + Send + Sync>;

/// Checks a slice or region name before it becomes part of action types.
pub(crate) fn validate_name(name: &str) -> Result<(), ConfigurationError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.contains('/') {
        "must not contain '/'"
    } else if name.starts_with("@@") {
        "the '@@' prefix is reserved"
    } else {
        return Ok(());
    };
    Err(ConfigurationError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Ordered handler registrations for one slice.
///
/// Handlers receive a working copy of the sub-state and edit it in place;
/// the compiler commits the copy as the next value.
pub struct Handlers<S> {
    entries: Vec<(String, HandlerFn<S>)>,
}

impl<S: StateValue> Handlers<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `handler` under `key`. The payload is decoded into `P`
    /// before the handler runs; use `()` for actions without payload.
    pub fn on<P, F>(self, key: impl Into<String>, handler: F) -> Self
    where
        P: DeserializeOwned,
        F: Fn(&mut S, P) + Send + Sync + 'static,
    {
        self.push(key, move |draft: &mut S, action: &Action| {
            let payload = action.decode_payload::<P>()?;
            handler(draft, payload);
            Ok(())
        })
    }

    /// Like [`Handlers::on`], but the handler may refuse the action. The
    /// working copy is discarded on refusal.
    pub fn try_on<P, F>(self, key: impl Into<String>, handler: F) -> Self
    where
        P: DeserializeOwned,
        F: Fn(&mut S, P) -> Result<(), String> + Send + Sync + 'static,
    {
        self.push(key, move |draft: &mut S, action: &Action| {
            let payload = action.decode_payload::<P>()?;
            handler(draft, payload)
                .map_err(|reason| TransitionError::rejected(action.action_type(), reason))
        })
    }

    fn push<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut S, &Action) -> Result<(), TransitionError> + Send + Sync + 'static,
    {
        self.entries.push((key.into(), Arc::new(handler)));
        self
    }
}

impl<S: StateValue> Default for Handlers<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the action for one compiled handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    action_type: ActionType,
}

impl ActionDescriptor {
    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    /// Action without payload.
    pub fn create(&self) -> Action {
        Action::new(self.action_type.clone())
    }

    pub fn with_payload<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Action, StoreError> {
        Action::encode(self.action_type.clone(), payload)
    }

    pub fn matches(&self, action: &Action) -> bool {
        action.action_type() == &self.action_type
    }
}

/// Action descriptors of one slice, keyed by handler key.
#[derive(Debug, Clone, Default)]
pub struct ActionCreators {
    entries: Vec<(String, ActionDescriptor)>,
}

impl ActionCreators {
    pub fn get(&self, key: &str) -> Option<&ActionDescriptor> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, descriptor)| descriptor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionDescriptor)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct SliceInner<S> {
    name: String,
    initial: Arc<S>,
    routes: HashMap<ActionType, usize>,
    handlers: Vec<HandlerFn<S>>,
    action_types: Vec<ActionType>,
}

/// Compiled transition function of a slice. Cheap to clone.
pub struct SliceReducer<S> {
    inner: Arc<SliceInner<S>>,
}

impl<S> Clone for SliceReducer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for SliceReducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceReducer")
            .field("name", &self.inner.name)
            .field("action_types", &self.inner.action_types)
            .finish()
    }
}

impl<S> SliceReducer<S> {
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

impl<S: StateValue> Reducer for SliceReducer<S> {
    type State = S;

    fn initial_state(&self) -> Arc<S> {
        Arc::clone(&self.inner.initial)
    }

    fn reduce(&self, state: &Arc<S>, action: &Action) -> Result<Arc<S>, TransitionError> {
        let Some(&index) = self.inner.routes.get(action.action_type()) else {
            return Ok(Arc::clone(state));
        };

        let mut draft = S::clone(state);
        (self.inner.handlers[index])(&mut draft, action)?;

        if draft == **state {
            Ok(Arc::clone(state))
        } else {
            Ok(Arc::new(draft))
        }
    }

    fn action_types(&self) -> Vec<ActionType> {
        self.inner.action_types.clone()
    }
}

/// Output of [`create_slice`].
#[derive(Debug, Clone)]
pub struct Slice<S> {
    pub reducer: SliceReducer<S>,
    pub actions: ActionCreators,
}

impl<S> Slice<S> {
    pub fn name(&self) -> &str {
        self.reducer.name()
    }

    pub fn action(&self, key: &str) -> Option<&ActionDescriptor> {
        self.actions.get(key)
    }
}

/// Compiles a slice. Every handler key `k` becomes action type `name/k`.
///
/// # Errors
/// Returns an error for an invalid name, an empty handler key, or a key
/// registered twice.
pub fn create_slice<S: StateValue>(
    name: impl Into<String>,
    initial_state: S,
    handlers: Handlers<S>,
) -> Result<Slice<S>, ConfigurationError> {
    let name = name.into();
    validate_name(&name)?;

    let mut routes = HashMap::with_capacity(handlers.entries.len());
    let mut compiled = Vec::with_capacity(handlers.entries.len());
    let mut action_types = Vec::with_capacity(handlers.entries.len());
    let mut creators = Vec::with_capacity(handlers.entries.len());

    for (key, handler) in handlers.entries {
        if key.is_empty() {
            return Err(ConfigurationError::EmptyHandlerKey { slice: name });
        }
        let action_type = ActionType::scoped(&name, &key);
        if routes.insert(action_type.clone(), compiled.len()).is_some() {
            return Err(ConfigurationError::DuplicateHandler { slice: name, key });
        }
        compiled.push(handler);
        action_types.push(action_type.clone());
        creators.push((key, ActionDescriptor { action_type }));
    }

    tracing::debug!(slice = %name, handlers = compiled.len(), "Slice compiled");

    Ok(Slice {
        reducer: SliceReducer {
            inner: Arc::new(SliceInner {
                name,
                initial: Arc::new(initial_state),
                routes,
                handlers: compiled,
                action_types,
            }),
        },
        actions: ActionCreators { entries: creators },
    })
}
