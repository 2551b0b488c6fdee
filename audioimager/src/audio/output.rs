//! Audio output using cpal
//!
//! Opens the output device, negotiates a stream format at the source's
//! sample rate, and registers a [`FrameSource`] as the stream callback.
//!
//! Negotiation works like a permissive "allow any change" open: an exact
//! stereo i16 config is preferred, otherwise any config at the right sample
//! rate is accepted and the callback converts samples and pads extra channels
//! with silence. A device that cannot run at the source rate is an error
//! (nothing is resampled).

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Host, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{debug, error, info, warn};

use crate::audio::types::PcmFormat;
use crate::error::{Error, Result};
use crate::playback::monitor::CallbackMonitor;
use crate::playback::session::FrameSource;

/// Frames converted per pass when the device buffer cannot be filled directly
const SCRATCH_FRAMES: usize = 4096;

/// Get the audio host by name, or the platform default.
///
/// # Errors
/// [`Error::AudioInit`] if the named host is unknown or unavailable.
pub fn resolve_host(name: Option<&str>) -> Result<Host> {
    let Some(name) = name else {
        return Ok(cpal::default_host());
    };

    let available = cpal::available_hosts();
    let id = available
        .iter()
        .copied()
        .find(|id| id.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let names: Vec<&str> = available.iter().map(|id| id.name()).collect();
            Error::AudioInit(format!(
                "Audio host '{}' not available (available: {})",
                name,
                names.join(", ")
            ))
        })?;

    cpal::host_from_id(id)
        .map_err(|e| Error::AudioInit(format!("Failed to initialize audio host '{}': {}", name, e)))
}

/// List available audio output devices.
pub fn list_devices(host: &Host) -> Result<Vec<String>> {
    let devices: Vec<String> = host
        .output_devices()
        .map_err(|e| Error::AudioInit(format!("Failed to enumerate devices: {}", e)))?
        .filter_map(|device| device.name().ok())
        .collect();

    debug!("Found {} output devices", devices.len());
    Ok(devices)
}

/// One supported output configuration range, as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCandidate {
    pub channels: u16,
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    pub sample_format: SampleFormat,
}

impl ConfigCandidate {
    fn supports_rate(&self, sample_rate: u32) -> bool {
        self.min_sample_rate <= sample_rate && sample_rate <= self.max_sample_rate
    }
}

/// Preference order of sample formats the callback can convert i16 into
fn format_rank(format: SampleFormat) -> Option<u8> {
    match format {
        SampleFormat::I16 => Some(0),
        SampleFormat::F32 => Some(1),
        SampleFormat::I32 => Some(2),
        SampleFormat::U16 => Some(3),
        _ => None,
    }
}

/// Pick the best candidate for stereo output at `sample_rate`.
///
/// Candidates must run at the exact rate and have at least two channels.
/// Among those: stereo before wider layouts, then i16 > f32 > i32 > u16.
pub fn choose_config(candidates: &[ConfigCandidate], sample_rate: u32) -> Option<ConfigCandidate> {
    candidates
        .iter()
        .filter(|c| c.channels >= 2 && c.supports_rate(sample_rate))
        .filter_map(|c| format_rank(c.sample_format).map(|rank| (c, rank)))
        .min_by_key(|(c, rank)| (c.channels, *rank))
        .map(|(c, _)| *c)
}

/// Audio output manager using cpal.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
}

impl AudioOutput {
    /// Open an output device for the given source format.
    ///
    /// Falls back to the default device if `device_name` is not found.
    ///
    /// # Arguments
    /// - `host`: Audio host from [`resolve_host`]
    /// - `device_name`: Optional device name (None = default device)
    /// - `format`: Source format; its sample rate must be supported
    /// - `buffer_size`: Optional buffer size in frames (None = device default)
    ///
    /// # Errors
    /// - [`Error::AudioInit`] if devices cannot be enumerated
    /// - [`Error::DeviceOpen`] if no device or no usable config exists
    pub fn open(
        host: &Host,
        device_name: Option<&str>,
        format: PcmFormat,
        buffer_size: Option<u32>,
    ) -> Result<Self> {
        let device = Self::find_device(host, device_name)?;

        let (mut config, sample_format) = Self::negotiate_config(&device, format.sample_rate)?;

        if let Some(size) = buffer_size {
            config.buffer_size = cpal::BufferSize::Fixed(size);
            debug!("Using requested buffer size: {} frames", size);
        } else {
            debug!("Using device default buffer size");
        }

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}, buffer_size={:?}",
            config.sample_rate.0, config.channels, sample_format, config.buffer_size
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
        })
    }

    fn find_device(host: &Host, device_name: Option<&str>) -> Result<Device> {
        if let Some(name) = device_name {
            let mut devices = host
                .output_devices()
                .map_err(|e| Error::AudioInit(format!("Failed to enumerate devices: {}", e)))?;

            if let Some(dev) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                info!("Found requested audio device: {}", name);
                return Ok(dev);
            }

            warn!("Requested device '{}' not found, falling back to default device", name);
        }

        let dev = host
            .default_output_device()
            .ok_or_else(|| Error::DeviceOpen("No default output device found".to_string()))?;

        let name = dev.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio device: {}", name);
        Ok(dev)
    }

    /// Get a stream configuration running at exactly `sample_rate`.
    fn negotiate_config(device: &Device, sample_rate: u32) -> Result<(StreamConfig, SampleFormat)> {
        let candidates: Vec<ConfigCandidate> = device
            .supported_output_configs()
            .map_err(|e| Error::DeviceOpen(format!("Failed to get device configs: {}", e)))?
            .map(|range| ConfigCandidate {
                channels: range.channels(),
                min_sample_rate: range.min_sample_rate().0,
                max_sample_rate: range.max_sample_rate().0,
                sample_format: range.sample_format(),
            })
            .collect();

        let chosen = choose_config(&candidates, sample_rate).ok_or_else(|| {
            Error::DeviceOpen(format!(
                "Device supports no stereo output config at {} Hz ({} configs offered)",
                sample_rate,
                candidates.len()
            ))
        })?;

        if chosen.channels != 2 || chosen.sample_format != SampleFormat::I16 {
            info!(
                "Device has no native stereo i16 config; using {} channels {:?}",
                chosen.channels, chosen.sample_format
            );
        }

        let config = StreamConfig {
            channels: chosen.channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, chosen.sample_format))
    }

    /// Start audio playback pulling frames from `source`.
    ///
    /// The source is moved onto the audio thread. Callback activity is
    /// reported through `monitor`.
    ///
    /// # Errors
    /// [`Error::DeviceOpen`] if the stream cannot be built or started.
    pub fn start<S: FrameSource>(&mut self, source: S, monitor: Arc<CallbackMonitor>) -> Result<()> {
        info!("Starting audio stream");

        let stream = match self.sample_format {
            SampleFormat::I16 if self.config.channels == 2 => self.build_direct_stream(source, monitor)?,
            SampleFormat::I16 => self.build_stream::<i16, S>(source, monitor)?,
            SampleFormat::F32 => self.build_stream::<f32, S>(source, monitor)?,
            SampleFormat::I32 => self.build_stream::<i32, S>(source, monitor)?,
            SampleFormat::U16 => self.build_stream::<u16, S>(source, monitor)?,
            sample_format => {
                return Err(Error::DeviceOpen(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::DeviceOpen(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);

        info!("Audio stream started successfully");
        Ok(())
    }

    /// Stereo i16 device: the source writes straight into the device buffer
    fn build_direct_stream<S: FrameSource>(
        &self,
        mut source: S,
        monitor: Arc<CallbackMonitor>,
    ) -> Result<Stream> {
        let error_monitor = Arc::clone(&monitor);

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let written = source.fill(data);
                    monitor.record_callback(data.len() / 2, written);
                    if source.is_exhausted() {
                        monitor.record_exhausted();
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_monitor.record_stream_error();
                },
                None,
            )
            .map_err(|e| Error::DeviceOpen(format!("Failed to build stream: {}", e)))
    }

    /// Any other layout: fill a preallocated i16 scratch buffer, then convert
    fn build_stream<T, S>(&self, mut source: S, monitor: Arc<CallbackMonitor>) -> Result<Stream>
    where
        T: SizedSample + FromSample<i16> + Send + 'static,
        S: FrameSource,
    {
        let channels = self.config.channels as usize;
        let error_monitor = Arc::clone(&monitor);
        let mut scratch = vec![0i16; SCRATCH_FRAMES * 2];

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let written = render_converted(&mut source, &mut scratch, data, channels);

                    monitor.record_callback(data.len() / channels, written);
                    if source.is_exhausted() {
                        monitor.record_exhausted();
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_monitor.record_stream_error();
                },
                None,
            )
            .map_err(|e| Error::DeviceOpen(format!("Failed to build stream: {}", e)))
    }

    /// Stop audio playback.
    ///
    /// Pauses the stream and drops the stream reference.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            info!("Stopping audio stream");
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        }

        Ok(())
    }

    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        // Ensure stream is stopped on drop
        let _ = self.stop();
    }
}

/// Fill a `channels`-wide device buffer from `source`, passing through the
/// i16 `scratch` buffer `scratch.len() / 2` frames at a time.
///
/// Returns the number of frames the source wrote; the rest is silence.
pub(crate) fn render_converted<T, S>(
    source: &mut S,
    scratch: &mut [i16],
    data: &mut [T],
    channels: usize,
) -> usize
where
    T: Sample + FromSample<i16>,
    S: FrameSource,
{
    let frames_per_pass = scratch.len() / 2;
    if frames_per_pass == 0 || channels == 0 {
        return 0;
    }

    let mut written = 0;
    for chunk in data.chunks_mut(frames_per_pass * channels) {
        let frames = &mut scratch[..(chunk.len() / channels) * 2];
        written += source.fill(frames);
        write_frames(chunk, frames, channels);
    }
    written
}

/// Copy interleaved stereo i16 `frames` into a device buffer of `channels`
/// channels, converting the sample type. Channels past the second get silence.
pub(crate) fn write_frames<T>(output: &mut [T], frames: &[i16], channels: usize)
where
    T: Sample + FromSample<i16>,
{
    for (out, pair) in output.chunks_mut(channels).zip(frames.chunks_exact(2)) {
        if out.len() < 2 {
            break;
        }
        out[0] = T::from_sample(pair[0]);
        out[1] = T::from_sample(pair[1]);
        for extra in &mut out[2..] {
            *extra = T::EQUILIBRIUM;
        }
    }
}
