//! The store: sole owner of the state tree.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};

use crate::config::{NotifyPolicy, StoreConfig, MAX_HISTORY_LIMIT};

use super::action::{Action, ActionType};
use super::combine::CombinedReducer;
use super::error::{ConfigurationError, StoreError};
use super::reducer::Reducer;
use super::state::StateValue;
use super::subscribers::{Listener, SubscriberRegistry, Subscription};

/// One accepted dispatch, kept for inspection.
#[derive(Debug, Clone)]
pub struct DispatchRecord {
    /// State version after the dispatch.
    pub version: u64,
    pub action_type: ActionType,
    /// Whether the root reference was replaced.
    pub changed: bool,
    pub timestamp: SystemTime,
}

/// Handle to a state container. Clones share the same store.
///
/// Collaborators receive a clone and talk to the store only through
/// [`read`](Store::read), [`dispatch`](Store::dispatch) and
/// [`subscribe`](Store::subscribe).
pub struct Store<R: Reducer> {
    inner: Arc<StoreInner<R>>,
}

struct StoreInner<R: Reducer> {
    config: StoreConfig,
    reducer: R,
    state: RwLock<Arc<R::State>>,
    /// Incremented once per accepted state change.
    version: AtomicU64,
    /// Set for the duration of one dispatch, notification included.
    dispatching: AtomicBool,
    listeners: Arc<SubscriberRegistry>,
    history: Mutex<VecDeque<DispatchRecord>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builds a store with the default [`StoreConfig`].
///
/// Without `initial_state` the reducer's own initial value is used. Either
/// way the reducer then sees the init action once before the store is
/// returned.
pub fn create_store<R: Reducer>(
    reducer: R,
    initial_state: Option<Arc<R::State>>,
) -> Result<Store<R>, StoreError> {
    Store::with_config(reducer, initial_state, StoreConfig::default())
}

impl<R: Reducer> Store<R> {
    /// # Errors
    /// Fails if `config.history_limit` exceeds [`MAX_HISTORY_LIMIT`], if
    /// `initial_state` does not fit the reducer, or if the reducer fails on
    /// the init action.
    pub fn with_config(
        reducer: R,
        initial_state: Option<Arc<R::State>>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        if config.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigurationError::HistoryLimitTooLarge {
                limit: config.history_limit,
                max: MAX_HISTORY_LIMIT,
            }
            .into());
        }
        let seed = match initial_state {
            Some(state) => {
                reducer.validate(&state)?;
                state
            }
            None => reducer.initial_state(),
        };
        let state = reducer.reduce(&seed, &Action::init())?;

        tracing::info!(
            store = %config.name,
            notify = ?config.notify,
            history_limit = config.history_limit,
            "Store created"
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                history: Mutex::new(VecDeque::new()),
                config,
                reducer,
                state: RwLock::new(state),
                version: AtomicU64::new(0),
                dispatching: AtomicBool::new(false),
                listeners: Arc::new(SubscriberRegistry::default()),
            }),
        })
    }

    /// Current state reference. No side effects.
    pub fn read(&self) -> Arc<R::State> {
        Arc::clone(&self.inner.state.read())
    }

    /// Runs `action` through the reducer, commits the result and notifies
    /// listeners. Returns the action for chaining.
    ///
    /// # Errors
    /// - [`StoreError::Reentrancy`] when called from a reducer or listener of
    ///   this store (or while another thread is dispatching). Nothing changes.
    /// - [`StoreError::Transition`] when the reducer fails. The last good
    ///   state stays committed.
    pub fn dispatch(&self, action: Action) -> Result<Action, StoreError> {
        let inner = &self.inner;
        if inner
            .dispatching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(
                store = %inner.config.name,
                action_type = %action.action_type(),
                "Rejected reentrant dispatch"
            );
            return Err(StoreError::Reentrancy {
                store: inner.config.name.clone(),
            });
        }
        let _reset = scopeguard::guard(&inner.dispatching, |flag| {
            flag.store(false, Ordering::Release);
        });

        let current = self.read();
        let next = inner.reducer.reduce(&current, &action)?;
        let changed = !Arc::ptr_eq(&current, &next);

        let version = if changed {
            *inner.state.write() = next;
            inner.version.fetch_add(1, Ordering::AcqRel) + 1
        } else {
            inner.version.load(Ordering::Acquire)
        };

        if inner.config.trace_dispatch {
            tracing::info!(store = %inner.config.name, action_type = %action.action_type(), version, changed, "Dispatched");
        } else {
            tracing::debug!(store = %inner.config.name, action_type = %action.action_type(), version, changed, "Dispatched");
        }
        self.record(&action, version, changed);

        if changed || inner.config.notify != NotifyPolicy::OnChange {
            for listener in inner.listeners.snapshot() {
                listener();
            }
        }

        Ok(action)
    }

    /// Registers `listener`. It runs synchronously, in registration order,
    /// after each successful dispatch (only after state changes under
    /// [`NotifyPolicy::OnChange`]).
    ///
    /// A listener that captures a clone of this store keeps the store alive
    /// until its [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Registers an already shared listener. Registering the same one twice
    /// yields two independent subscriptions.
    pub fn subscribe_shared(&self, listener: Listener) -> Subscription {
        let id = self.inner.listeners.add(listener);
        tracing::trace!(store = %self.inner.config.name, listener = ?id, "Listener added");
        Subscription::new(id, &self.inner.listeners)
    }

    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Most recent dispatches, oldest first.
    pub fn history(&self) -> Vec<DispatchRecord> {
        self.inner.history.lock().iter().cloned().collect()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn is_dispatching(&self) -> bool {
        self.inner.dispatching.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn reducer(&self) -> &R {
        &self.inner.reducer
    }

    fn record(&self, action: &Action, version: u64, changed: bool) {
        let limit = self.inner.config.history_limit;
        if limit == 0 {
            return;
        }
        let mut history = self.inner.history.lock();
        while history.len() >= limit {
            history.pop_front();
        }
        history.push_back(DispatchRecord {
            version,
            action_type: action.action_type().clone(),
            changed,
            timestamp: SystemTime::now(),
        });
    }
}

impl Store<CombinedReducer> {
    /// Typed read of one region of a composed store.
    pub fn region<T: StateValue>(&self, name: &str) -> Option<Arc<T>> {
        self.read().get(name)
    }
}

impl<R: Reducer> fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field("version", &self.version())
            .field("listeners", &self.listener_count())
            .field("state", &self.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reducer::reducer_fn;
    use crate::engine::INIT_ACTION_TYPE;
    use std::sync::atomic::AtomicUsize;

    fn counter_store(config: StoreConfig) -> Store<impl Reducer<State = i64>> {
        let reducer = reducer_fn(0_i64, |state, action| {
            Ok(match action.action_type().as_str() {
                "increment" => Some(state + 1),
                "decrement" => Some(state - 1),
                _ => None,
            })
        });
        Store::with_config(reducer, None, config).unwrap()
    }

    #[test]
    fn init_action_reaches_reducer_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reducer = {
            let seen = Arc::clone(&seen);
            reducer_fn(0_i64, move |_, action| {
                seen.lock().push(action.action_type().to_string());
                Ok(None)
            })
        };
        let store = create_store(reducer, None).unwrap();
        assert_eq!(*seen.lock(), vec![INIT_ACTION_TYPE.to_string()]);
        assert_eq!(store.version(), 0);
        assert!(store.history().is_empty());
    }

    #[test]
    fn version_counts_only_changes() {
        let store = counter_store(StoreConfig::default());
        store.dispatch(Action::new("increment")).unwrap();
        store.dispatch(Action::new("noop")).unwrap();
        store.dispatch(Action::new("decrement")).unwrap();
        assert_eq!(store.version(), 2);
        assert_eq!(*store.read(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let store = counter_store(StoreConfig {
            history_limit: 2,
            ..StoreConfig::default()
        });
        for _ in 0..5 {
            store.dispatch(Action::new("increment")).unwrap();
        }
        let history = store.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version, 4);
        assert_eq!(history[1].version, 5);
        assert!(history.iter().all(|r| r.changed));
    }

    #[test]
    fn zero_history_limit_disables_log() {
        let store = counter_store(StoreConfig {
            history_limit: 0,
            ..StoreConfig::default()
        });
        store.dispatch(Action::new("increment")).unwrap();
        assert!(store.history().is_empty());
    }

    #[test]
    fn default_policy_notifies_on_noop() {
        let store = counter_store(StoreConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let calls = Arc::clone(&calls);
            store.subscribe(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        store.dispatch(Action::new("noop")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn on_change_policy_skips_noop() {
        let store = counter_store(StoreConfig {
            notify: NotifyPolicy::OnChange,
            ..StoreConfig::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let calls = Arc::clone(&calls);
            store.subscribe(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        store.dispatch(Action::new("noop")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn oversized_history_limit_is_rejected() {
        let reducer = reducer_fn(0_i64, |_, _| Ok(None));
        let config = StoreConfig {
            history_limit: usize::MAX,
            ..StoreConfig::default()
        };
        let err = Store::with_config(reducer, None, config).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Configuration(ConfigurationError::HistoryLimitTooLarge { .. })
        ));
    }

    #[test]
    fn largest_history_limit_is_accepted() {
        let store = counter_store(StoreConfig {
            history_limit: MAX_HISTORY_LIMIT,
            ..StoreConfig::default()
        });
        store.dispatch(Action::new("increment")).unwrap();
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn dispatch_returns_the_action() {
        let store = counter_store(StoreConfig::default());
        let returned = store.dispatch(Action::new("increment")).unwrap();
        assert!(returned.is("increment"));
        assert!(!store.is_dispatching());
    }
}
