//! Error types for the manipulator

use std::path::PathBuf;
use thiserror::Error;

use crate::handle::Mode;

/// Manipulator errors.
///
/// Only construction and configuration I/O fail; everything on the per-event
/// path degrades to a neutral result instead.
#[derive(Debug, Error)]
pub enum ManipulatorError {
    /// The viewport could not provide a camera at construction time
    #[error("Viewport has no camera available")]
    CameraUnavailable,

    /// Requested handle belongs to a disabled mode
    #[error("Manipulation mode is disabled: {0:?}")]
    ModeDisabled(Mode),

    /// Configuration file could not be read or written
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("Invalid manipulator config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize manipulator config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Typed-value grammar failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Nothing was typed
    #[error("Empty input")]
    Empty,

    /// A token is not a number with a recognised suffix
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    /// Plane input needs exactly two components
    #[error("Expected {expected} values, found {found}")]
    WrongTokenCount { expected: usize, found: usize },
}

/// Result type for manipulator operations
pub type Result<T> = std::result::Result<T, ManipulatorError>;
