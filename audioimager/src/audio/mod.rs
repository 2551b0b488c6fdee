//! Audio I/O: WAV loading and device output

pub mod loader;
pub mod output;
pub mod types;

pub use loader::load_wav;
pub use output::AudioOutput;
pub use types::{PcmBuffer, PcmFormat, StereoFrame};
