use std::path::PathBuf;

/// Errors raised by catalog operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("invalid capability record: {0}")]
    InvalidRecord(String),
}

/// Errors raised while loading or persisting resolver settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Unified error type for the assistant core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
