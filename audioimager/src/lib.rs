//! # audioimager
//!
//! Plays a 16-bit stereo WAV file while reshaping its stereo image in real
//! time. Every frame is split into its mono (sum) and cancellation
//! (difference) components, each is weighted by a user strength, and the
//! pair is recombined before it reaches the output device.
//!
//! **Architecture:** hound loads the PCM buffer, a [`PlaybackSession`] owns
//! it together with the read cursor, and cpal pulls transformed frames from
//! the session on the audio thread.

pub mod audio;
pub mod config;
pub mod console;
pub mod error;
pub mod playback;
pub mod transform;

pub use config::{PlayerConfig, Strengths};
pub use error::{Error, Result};
pub use playback::{PlaybackSession, StrengthControl};
pub use transform::StereoTransform;
