//! Mono/cancellation stereo transform
//!
//! Each frame is split into its sum (`L + R`, the in-phase "mono" part) and
//! difference (`L - R`, the out-of-phase "cancellation" part). The two parts
//! are weighted by the mono and cancellation strengths and recombined:
//!
//! ```text
//! a = m * (L + R) + c * (L - R)
//! b = m * (L + R) - c * (L - R)
//! ```
//!
//! and both are divided by a normalization divisor derived from `|m|` and
//! `|c|`. With `m = c` the transform is the identity; `c = 0` collapses the
//! image to mono; `m = 0` keeps only the side signal.
//!
//! Results are narrowed to i16 by truncation of the high bits, so values
//! outside the sample range wrap around instead of clipping.

use crate::audio::StereoFrame;
use crate::config::Strengths;
use crate::error::Result;

/// Normalization divisor for a strength pair.
///
/// `2 * max(|m|, |c|)` when the magnitudes differ, `|m| + |c|` when they are
/// equal. Returns `None` when both strengths are zero.
pub fn divisor(mono: i32, cancel: i32) -> Option<i64> {
    let m = i64::from(mono).abs();
    let c = i64::from(cancel).abs();

    let div = if m > c {
        2 * m
    } else if c > m {
        2 * c
    } else {
        m + c
    };

    (div != 0).then_some(div)
}

/// Transform engine with the strength pair and divisor precomputed.
///
/// Built only from validated [`Strengths`], so [`apply`](Self::apply) never
/// divides by zero. Cheap to copy; the audio callback keeps one by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StereoTransform {
    mono: i64,
    cancel: i64,
    divisor: i64,
}

impl StereoTransform {
    pub fn new(strengths: Strengths) -> Self {
        let mono = strengths.mono();
        let cancel = strengths.cancel();
        Self {
            mono: i64::from(mono),
            cancel: i64::from(cancel),
            // Strengths rejects the pair that has no divisor
            divisor: divisor(mono, cancel).unwrap_or(1),
        }
    }

    pub fn divisor(&self) -> i64 {
        self.divisor
    }

    /// Transform one frame.
    #[inline]
    pub fn apply(&self, frame: StereoFrame) -> StereoFrame {
        let left = i64::from(frame.left);
        let right = i64::from(frame.right);

        let sum = left + right;
        let diff = left - right;

        let a = self.mono * sum + self.cancel * diff;
        let b = self.mono * sum - self.cancel * diff;

        // i64 division truncates toward zero; `as i16` wraps
        StereoFrame {
            left: (a / self.divisor) as i16,
            right: (b / self.divisor) as i16,
        }
    }
}

/// One-shot transform of a single `(left, right)` pair.
///
/// Fails with [`Error::Configuration`](crate::Error::Configuration) when both strengths are zero.
pub fn transform(left: i16, right: i16, mono: i32, cancel: i32) -> Result<(i16, i16)> {
    let engine = StereoTransform::new(Strengths::new(mono, cancel)?);
    let out = engine.apply(StereoFrame::from_stereo(left, right));
    Ok((out.left, out.right))
}
