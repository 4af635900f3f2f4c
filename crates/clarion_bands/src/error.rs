//! Band Model Error Types

use thiserror::Error;

/// Errors that can occur in band-model operations
#[derive(Error, Debug)]
pub enum BandError {
    #[error("Gain curve length mismatch: expected {expected} bands, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Unsupported band count: {0} (must be 10, 15 or 20)")]
    UnsupportedBandCount(usize),
}
