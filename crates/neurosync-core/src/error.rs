//! Error types for NeuroSync Core
//!
//! The state machines in this crate are total and never fail. Errors only
//! appear at the edges: loading, saving and validating configuration. We use `thiserror` for the Display/Error implementations.

use thiserror::Error;

/// Result type alias for NeuroSync operations
pub type Result<T> = std::result::Result<T, NeuroSyncError>;

/// Main error type for NeuroSync operations
#[derive(Error, Debug)]
pub enum NeuroSyncError {
    /// Configuration rejected by `EngineConfig::validate`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML encode errors
    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        source: Box<NeuroSyncError>,
    },
}

impl NeuroSyncError {
    /// Add context to an error
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add lazy context to a Result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.context(f()))
    }
}
