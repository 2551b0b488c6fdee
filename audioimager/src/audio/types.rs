//! Core audio data types
//!
//! Defines the loaded PCM buffer and the stereo frame passed between the
//! transform and the output device.

/// Format descriptor reported by the WAV loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count
    pub channels: u16,

    /// Bits per sample
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// 16-bit interleaved stereo, the only layout the player accepts
    pub fn stereo_i16(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 2,
            bits_per_sample: 16,
        }
    }

    /// Whether samples can be read as interleaved `[L, R]` i16 pairs
    pub fn is_stereo_i16(&self) -> bool {
        self.channels == 2 && self.bits_per_sample == 16
    }
}

/// PcmBuffer holds the whole decoded source in RAM.
///
/// **Format:**
/// - Samples are i16, exactly as stored in the file
/// - Stereo interleaved: [L, R, L, R, ...]
/// - Sample rate is the file's own; nothing is resampled
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    /// PCM audio samples (interleaved stereo)
    /// Index pattern: 0=left, 1=right, 2=left, 3=right, etc.
    samples: Vec<i16>,

    format: PcmFormat,
}

impl PcmBuffer {
    pub fn new(samples: Vec<i16>, format: PcmFormat) -> Self {
        Self { samples, format }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    /// Buffer length in bytes (2 bytes per sample)
    pub fn byte_len(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    /// Number of complete stereo frames. A dangling odd sample is not a frame.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / 2
    }

    /// Get duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.format.sample_rate as f64
    }
}

/// StereoFrame represents a single stereo sample (one frame of audio).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StereoFrame {
    /// Left channel sample
    pub left: i16,

    /// Right channel sample
    pub right: i16,
}

impl StereoFrame {
    /// Create a silent frame (0, 0)
    pub fn zero() -> Self {
        StereoFrame { left: 0, right: 0 }
    }

    /// Create a frame from left and right samples
    pub fn from_stereo(left: i16, right: i16) -> Self {
        StereoFrame { left, right }
    }
}
