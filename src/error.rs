//! Unified error types for viewkit.
//!
//! The template cascade and the capability composer never fail: missing
//! context shrinks a candidate list and a missing capability reads as "not
//! held". Errors only exist at the edges (configuration, role storage,
//! layout files, parsing capability names typed by a human). Where an edge
//! error must not stop a render or a permission check, callers fall back
//! through [`FailOpen`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for viewkit operations.
#[derive(Error, Debug)]
pub enum ViewkitError {
    /// I/O errors from role registry or layout file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// A name inside an owned capability namespace that matches no capability.
    #[error("unknown capability: {name}")]
    UnknownCapability { name: String },

    /// Layout store errors (missing context, unknown attribute).
    #[error("layout error: {message}")]
    Layout { message: String },
}

/// A specialized Result type for viewkit operations.
pub type Result<T> = std::result::Result<T, ViewkitError>;

impl ViewkitError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an unknown capability error.
    pub fn unknown_capability(name: impl Into<String>) -> Self {
        Self::UnknownCapability { name: name.into() }
    }

    /// Create a layout error.
    pub fn layout(message: impl Into<String>) -> Self {
        Self::Layout {
            message: message.into(),
        }
    }
}

impl From<io::Error> for ViewkitError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ViewkitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and substitute a safe value instead of propagating.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the viewkit CLI.
pub mod exit_codes {
    /// Command succeeded (or a capability check passed).
    pub const OK: i32 = 0;

    /// A capability check returned false.
    pub const DENIED: i32 = 1;

    /// The command failed or panicked.
    pub const ERROR: i32 = 2;
}
