//! Platform Error Types

use thiserror::Error;

/// Errors from the external collaborator boundary
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Effect binding lost control of the audio session")]
    ControlLost,

    #[error("Usage signal query failed: {0}")]
    SignalQuery(String),

    #[error("Device output query failed: {0}")]
    DeviceQuery(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
