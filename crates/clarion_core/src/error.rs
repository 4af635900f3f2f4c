//! Core Error Types

use thiserror::Error;

/// Errors that can occur in the parameter store, preset registry and
/// switch engine
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Effect binding control could not be reacquired")]
    ControlLost,

    #[error("A preset named '{0}' already exists")]
    DuplicateName(String),

    #[error("Preset name too long: {len} characters (max 50)")]
    NameTooLong { len: usize },

    #[error("Unknown profile id: {0}")]
    UnknownProfile(u32),

    #[error("Band model error: {0}")]
    Band(#[from] clarion_bands::BandError),

    #[error("Platform error: {0}")]
    Platform(#[from] clarion_platform::PlatformError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, StoreError>;
