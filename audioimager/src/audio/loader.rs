//! WAV loading using hound
//!
//! Reads the whole file into a [`PcmBuffer`] and checks it against the only
//! layout the transform understands: 16-bit signed integer, 2 channels.
//! Anything else is a load failure, never a silent reinterpretation.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec};
use tracing::debug;

use crate::audio::types::{PcmBuffer, PcmFormat};
use crate::error::{Error, Result};

/// Samples reserved up front when the real stream size is unknown
const MAX_RESERVED_SAMPLES: usize = 1 << 20;

/// Load a 16-bit stereo WAV file.
///
/// # Errors
/// [`Error::FileLoad`] with the path and reason when the file is missing,
/// unreadable, malformed, or not 16-bit stereo integer PCM.
pub fn load_wav(path: impl AsRef<Path>) -> Result<PcmBuffer> {
    let path = path.as_ref();
    debug!("Loading WAV file: {}", path.display());

    let file_len = std::fs::metadata(path).map_err(|e| Error::file_load(path, e))?.len();
    let reader = WavReader::open(path).map_err(|e| Error::file_load(path, e))?;
    read_samples(reader, path, Some(file_len))
}

/// Decode a 16-bit stereo WAV stream. `path` only labels errors.
pub fn load_wav_from_reader<R: Read>(source: R, path: impl AsRef<Path>) -> Result<PcmBuffer> {
    let path = path.as_ref();
    let reader = WavReader::new(source).map_err(|e| Error::file_load(path, e))?;
    read_samples(reader, path, None)
}

/// Capacity to reserve for a data chunk that declares `declared` samples.
///
/// The declared length comes from the header and may be far larger than the
/// file (streaming encoders often write a placeholder), so it is bounded by
/// what the file can actually hold.
fn initial_capacity(declared: u32, stream_bytes: Option<u64>) -> usize {
    let limit = match stream_bytes {
        Some(bytes) => usize::try_from(bytes / 2).unwrap_or(usize::MAX),
        None => MAX_RESERVED_SAMPLES,
    };
    usize::try_from(declared).unwrap_or(usize::MAX).min(limit)
}

fn read_samples<R: Read>(
    mut reader: WavReader<R>,
    path: &Path,
    stream_bytes: Option<u64>,
) -> Result<PcmBuffer> {
    let spec = reader.spec();
    validate_spec(&spec).map_err(|reason| Error::file_load(path, reason))?;

    let mut samples = Vec::with_capacity(initial_capacity(reader.len(), stream_bytes));
    for sample in reader.samples::<i16>() {
        samples.push(sample.map_err(|e| Error::file_load(path, e))?);
    }

    let buffer = PcmBuffer::new(samples, PcmFormat::stereo_i16(spec.sample_rate));
    debug!(
        "Loaded {} frames ({} bytes) at {} Hz",
        buffer.frame_count(),
        buffer.byte_len(),
        buffer.sample_rate()
    );

    Ok(buffer)
}

/// Check the file's format descriptor against the 2-channel 16-bit assumption.
fn validate_spec(spec: &WavSpec) -> std::result::Result<(), String> {
    let format = PcmFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
    };

    if spec.sample_format != SampleFormat::Int || !format.is_stereo_i16() {
        let kind = match spec.sample_format {
            SampleFormat::Int => "integer",
            SampleFormat::Float => "float",
        };
        return Err(format!(
            "unsupported format: {} channel(s), {}-bit {}; expected 2 channels, 16-bit integer",
            spec.channels, spec.bits_per_sample, kind
        ));
    }

    if spec.sample_rate == 0 {
        return Err("unsupported format: sample rate is 0 Hz".to_string());
    }

    Ok(())
}
