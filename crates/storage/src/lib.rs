//! Storage Layer
//!
//! Persists user-facing settings as one JSON document of fixed keys.
//! Missing or unreadable data always degrades to defaults.

mod keys;
mod settings;

pub use keys::{Dimensions, Layout, Preferences, Profile, SettingsKey};
pub use settings::SettingsStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Lock error: {0}")]
    Lock(String),
}
