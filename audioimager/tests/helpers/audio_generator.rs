//! Deterministic test signals
//!
//! Frames are returned as interleaved `[L, R, L, R, ...]` i16 samples, ready
//! to write with hound or to wrap in a `PcmBuffer`.

use std::f32::consts::PI;

/// Sine on the left channel, inverted sine on the right (pure side signal
/// when `inverted` is true, pure mid signal otherwise).
///
/// # Arguments
/// * `frames` - Number of stereo frames
/// * `sample_rate` - Sample rate in Hz
/// * `frequency_hz` - Sine frequency in Hz (e.g., 440.0 for A4)
/// * `amplitude` - Amplitude 0.0-1.0
/// * `inverted` - Negate the right channel
pub fn sine_frames(
    frames: usize,
    sample_rate: u32,
    frequency_hz: f32,
    amplitude: f32,
    inverted: bool,
) -> Vec<i16> {
    let amplitude_i16 = amplitude * i16::MAX as f32;
    let mut samples = Vec::with_capacity(frames * 2);

    for frame_idx in 0..frames {
        let t = frame_idx as f32 / sample_rate as f32;
        let value = ((2.0 * PI * frequency_hz * t).sin() * amplitude_i16) as i16;

        samples.push(value);
        samples.push(if inverted { -value } else { value });
    }

    samples
}

/// Left channel counts up from `start`, right channel counts down from it.
pub fn ramp_frames(frames: usize, start: i16) -> Vec<i16> {
    (0..frames)
        .flat_map(|i| {
            let step = i as i16;
            [start.wrapping_add(step), start.wrapping_sub(step)]
        })
        .collect()
}

/// Interleave separate channel buffers
pub fn interleave(left: &[i16], right: &[i16]) -> Vec<i16> {
    assert_eq!(left.len(), right.len(), "Channels must have same length");
    left.iter().zip(right).flat_map(|(&l, &r)| [l, r]).collect()
}
