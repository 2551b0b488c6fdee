//! Error types for audioimager
//!
//! One variant per failure class the player distinguishes. Each class maps to
//! its own process exit code so scripts can tell a bad argument from a missing
//! file from a missing sound card.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for audioimager
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong argument count or unparsable numeric argument
    #[error("Usage error: {0}")]
    Usage(String),

    /// Audio host could not be initialized or queried
    #[error("Audio subsystem init error: {0}")]
    AudioInit(String),

    /// WAV file missing, unreadable, or not 16-bit stereo PCM
    #[error("Could not open {}: {reason}", path.display())]
    FileLoad {
        path: PathBuf,
        reason: String,
    },

    /// No usable output device or stream configuration
    #[error("Audio device open error: {0}")]
    DeviceOpen(String),

    /// Strength pair that leaves the transform without a divisor
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure reported by a running output stream
    #[error("Audio output error: {0}")]
    AudioOutput(String),
}

impl Error {
    /// Process exit code for this error class.
    ///
    /// 0 is reserved for a normal quit and 2 matches clap's usage exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) => 2,
            Error::AudioInit(_) => 3,
            Error::FileLoad { .. } => 4,
            Error::DeviceOpen(_) => 5,
            Error::Configuration(_) => 6,
            Error::AudioOutput(_) => 7,
        }
    }

    pub(crate) fn file_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::FileLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type using audioimager Error
pub type Result<T> = std::result::Result<T, Error>;
