//! Playback session: PCM buffer, read cursor, and the transform
//!
//! The session is moved into the audio callback and is only ever touched by
//! the callback thread. Strength changes arrive through [`StrengthControl`].

use crate::audio::{PcmBuffer, StereoFrame};
use crate::config::Strengths;
use crate::playback::control::StrengthControl;
use crate::transform::StereoTransform;

/// Session lifecycle. `Playing -> Exhausted` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Cursor within bounds
    Playing,

    /// No input left; every production call returns nothing
    Exhausted,
}

/// Something the output stream can pull interleaved stereo i16 frames from.
///
/// Implementations run on the real-time audio thread: no allocation, locking,
/// blocking, or I/O.
pub trait FrameSource: Send + 'static {
    /// Write up to `output.len() / 2` frames into `output` as `[L, R, ...]`,
    /// zero the remainder, and return the number of frames written.
    fn fill(&mut self, output: &mut [i16]) -> usize;

    /// Whether the source will never produce another frame
    fn is_exhausted(&self) -> bool;
}

/// Owns the loaded buffer and the read cursor for one playback.
#[derive(Debug)]
pub struct PlaybackSession {
    buffer: PcmBuffer,

    /// Offset in samples (not frames) of the next frame to read
    cursor: usize,

    state: SessionState,

    control: StrengthControl,

    /// Packed strengths `transform` was built from
    strength_bits: u64,

    transform: StereoTransform,
}

impl PlaybackSession {
    /// New session at cursor 0 with its own strength control.
    pub fn new(buffer: PcmBuffer, strengths: Strengths) -> Self {
        Self::with_control(buffer, StrengthControl::new(strengths))
    }

    /// New session at cursor 0 reading strengths from a shared control.
    pub fn with_control(buffer: PcmBuffer, control: StrengthControl) -> Self {
        let (strength_bits, strengths) = control.snapshot();
        Self {
            buffer,
            cursor: 0,
            state: SessionState::Playing,
            control,
            strength_bits,
            transform: StereoTransform::new(strengths),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Exhausted
    }

    /// Cursor position in samples
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frames_played(&self) -> usize {
        self.cursor / 2
    }

    pub fn frames_remaining(&self) -> usize {
        self.buffer.samples().len().saturating_sub(self.cursor) / 2
    }

    /// Transform and write up to `output.len()` frames, returning how many
    /// were written. Returns 0 once the buffer is exhausted.
    pub fn produce_frames(&mut self, output: &mut [StereoFrame]) -> usize {
        self.render(output.len(), |index, frame| output[index] = frame)
    }

    /// Transform up to `capacity` frames, handing each to `sink` with its
    /// output index, and advance the cursor past them.
    fn render(&mut self, capacity: usize, mut sink: impl FnMut(usize, StereoFrame)) -> usize {
        let count = self.begin(capacity);
        if count == 0 {
            return 0;
        }

        let transform = self.transform;
        let end = self.cursor + count * 2;
        let input = &self.buffer.samples()[self.cursor..end];

        for (index, pair) in input.chunks_exact(2).enumerate() {
            sink(index, transform.apply(StereoFrame::from_stereo(pair[0], pair[1])));
        }

        self.cursor = end;
        count
    }

    /// Bound check and strength refresh at the top of a production call.
    ///
    /// Returns the number of frames to produce for `capacity` slots.
    fn begin(&mut self, capacity: usize) -> usize {
        if self.state == SessionState::Exhausted {
            return 0;
        }

        // A frame needs both of its samples inside the buffer
        if self.cursor + 2 > self.buffer.samples().len() {
            self.state = SessionState::Exhausted;
            return 0;
        }

        let (bits, strengths) = self.control.snapshot();
        if bits != self.strength_bits {
            self.strength_bits = bits;
            self.transform = StereoTransform::new(strengths);
        }

        capacity.min(self.frames_remaining())
    }
}

impl FrameSource for PlaybackSession {
    fn fill(&mut self, output: &mut [i16]) -> usize {
        let count = self.render(output.len() / 2, |index, frame| {
            output[index * 2] = frame.left;
            output[index * 2 + 1] = frame.right;
        });

        output[count * 2..].fill(0);
        count
    }

    fn is_exhausted(&self) -> bool {
        PlaybackSession::is_exhausted(self)
    }
}
