//! Test helper modules for audioimager integration tests
//!
//! - WavFixtures: temporary directory of generated WAV files
//! - audio_generator: deterministic sample patterns

#![allow(dead_code)]

pub mod audio_generator;
pub mod wav_fixtures;

pub use audio_generator::{interleave, ramp_frames, sine_frames};
pub use wav_fixtures::WavFixtures;
