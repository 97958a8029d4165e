//! Top-level gameplay error.

use phonics_audio::AudioError;
use phonics_common::ConfigurationError;
use thiserror::Error;

use crate::finalize::FinalizeError;
use crate::session::SessionError;

/// Errors surfaced to the application shell.
#[derive(Debug, Error)]
pub enum GameError {
    /// Catalog or session configuration is unusable.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Session transition refused.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Audio backend could not be initialised.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Finalize delivery failed.
    #[error(transparent)]
    Finalize(#[from] FinalizeError),
}

/// Result type alias for gameplay operations.
pub type GameResult<T> = Result<T, GameError>;
