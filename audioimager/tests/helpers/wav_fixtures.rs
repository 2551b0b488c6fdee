//! WAV fixture files in a temporary directory
//!
//! The directory (and every file in it) is removed when the fixture set is
//! dropped.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Generator for WAV files used by loader and playback tests
pub struct WavFixtures {
    temp_dir: TempDir,
}

impl WavFixtures {
    pub fn new() -> FixtureResult<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Create a file path in the temporary directory
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join(filename)
    }

    /// Path that is guaranteed not to exist
    pub fn nonexistent_file(&self) -> PathBuf {
        self.file_path("missing.wav")
    }

    /// Write 16-bit stereo PCM samples (interleaved)
    pub fn stereo_i16(&self, filename: &str, sample_rate: u32, samples: &[i16]) -> FixtureResult<PathBuf> {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        self.write_i16(filename, spec, samples)
    }

    /// Write 16-bit mono PCM samples
    pub fn mono_i16(&self, filename: &str, sample_rate: u32, samples: &[i16]) -> FixtureResult<PathBuf> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        self.write_i16(filename, spec, samples)
    }

    /// Write 32-bit float stereo samples
    pub fn stereo_f32(&self, filename: &str, sample_rate: u32, samples: &[f32]) -> FixtureResult<PathBuf> {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let path = self.file_path(filename);
        let mut writer = WavWriter::create(&path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(path)
    }

    /// Write arbitrary bytes (for malformed-file tests)
    pub fn raw(&self, filename: &str, bytes: &[u8]) -> FixtureResult<PathBuf> {
        let path = self.file_path(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Copy of `source` with everything after `len` bytes cut off
    pub fn truncated_copy(&self, source: &Path, filename: &str, len: usize) -> FixtureResult<PathBuf> {
        let bytes = fs::read(source)?;
        self.raw(filename, &bytes[..len.min(bytes.len())])
    }

    /// Copy of `source` whose `data` chunk claims `declared` bytes, as left
    /// behind by an encoder that never rewrote its placeholder header
    pub fn declared_data_len_copy(&self, source: &Path, filename: &str, declared: u32) -> FixtureResult<PathBuf> {
        let mut bytes = fs::read(source)?;
        let pos = bytes
            .windows(4)
            .position(|w| w == b"data")
            .ok_or("fixture has no data chunk")?;
        bytes[pos + 4..pos + 8].copy_from_slice(&declared.to_le_bytes());
        self.raw(filename, &bytes)
    }

    fn write_i16(&self, filename: &str, spec: WavSpec, samples: &[i16]) -> FixtureResult<PathBuf> {
        let path = self.file_path(filename);
        let mut writer = WavWriter::create(&path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(path)
    }
}
