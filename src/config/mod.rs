mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, LoggingConfig, NotifyPolicy, StoreConfig, MAX_HISTORY_LIMIT};
