use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Behaviour of one store instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Label used in log events and reentrancy errors (default: "store").
    #[serde(default = "default_store_name")]
    pub name: String,
    /// When listeners run after a dispatch.
    #[serde(default)]
    pub notify: NotifyPolicy,
    /// Number of dispatch records kept for inspection; 0 disables the log (default: 64).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Log every dispatch at info level instead of debug.
    #[serde(default)]
    pub trace_dispatch: bool,
}

/// When the store notifies its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// After every successful dispatch, including no-ops.
    #[default]
    EveryDispatch,
    /// Only when the root state reference changed.
    OnChange,
}

/// Logging settings for the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `SLICESTORE_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Upper bound for `StoreConfig::history_limit`, enforced when a store is built.
pub const MAX_HISTORY_LIMIT: usize = 10_000;

fn default_store_name() -> String {
    "store".to_string()
}

fn default_history_limit() -> usize {
    64
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            notify: NotifyPolicy::default(),
            history_limit: default_history_limit(),
            trace_dispatch: false,
        }
    }
}

impl StoreConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
