//! audioimager runtime configuration
//!
//! Everything here is supplied on the command line (or its environment
//! fallbacks) once at startup. Nothing is persisted.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Validated mono/cancellation strength pair.
///
/// Any sign and magnitude is accepted except both zero, which would leave the
/// transform's normalization divisor at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strengths {
    mono: i32,
    cancel: i32,
}

impl Strengths {
    pub fn new(mono: i32, cancel: i32) -> Result<Self> {
        if mono == 0 && cancel == 0 {
            return Err(Error::Configuration(
                "mono and cancellation strength cannot both be zero".to_string(),
            ));
        }
        Ok(Self { mono, cancel })
    }

    pub fn mono(&self) -> i32 {
        self.mono
    }

    pub fn cancel(&self) -> i32 {
        self.cancel
    }

    /// Same pair with the mono strength replaced
    pub fn with_mono(&self, mono: i32) -> Result<Self> {
        Self::new(mono, self.cancel)
    }

    /// Same pair with the cancellation strength replaced
    pub fn with_cancel(&self, cancel: i32) -> Result<Self> {
        Self::new(self.mono, cancel)
    }
}

impl Default for Strengths {
    /// Unit strengths: the transform passes audio through unchanged.
    fn default() -> Self {
        Self { mono: 1, cancel: 1 }
    }
}

impl std::fmt::Display for Strengths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mono={} cancel={}", self.mono, self.cancel)
    }
}

/// Parse a strength argument as a signed decimal integer.
///
/// Unlike a C `atoi`, garbage is an error rather than a silent zero.
pub fn parse_strength(name: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|e| Error::Usage(format!("{} must be a signed integer, got '{}': {}", name, value, e)))
}

/// Player configuration resolved from the command line
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub wav_path: PathBuf,
    pub strengths: Strengths,
    /// Output device name (None = host default)
    pub device_name: Option<String>,
    /// Audio host name (None = platform default)
    pub host_name: Option<String>,
    /// Fixed device buffer size in frames (None = device default)
    pub buffer_size: Option<u32>,
    /// Quit once the source is exhausted instead of waiting for the user
    pub exit_on_end: bool,
}
