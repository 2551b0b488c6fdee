//! Lock-free strength control shared with the audio callback
//!
//! The main thread may retune strengths while the callback is running. Both
//! strengths live in a single `AtomicU64` so the callback never observes a
//! half-updated pair (for example a new mono strength with an old cancel
//! strength of zero).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::Strengths;
use crate::error::Result;

fn pack(strengths: Strengths) -> u64 {
    ((strengths.mono() as u32 as u64) << 32) | strengths.cancel() as u32 as u64
}

fn unpack(bits: u64) -> (i32, i32) {
    ((bits >> 32) as u32 as i32, bits as u32 as i32)
}

/// Shared mono/cancellation strength pair.
///
/// Cloning is cheap (single `Arc` increment). All methods are safe to call
/// from any thread; [`load`](Self::load) is real-time safe.
#[derive(Clone, Debug)]
pub struct StrengthControl {
    bits: Arc<AtomicU64>,
}

impl StrengthControl {
    pub fn new(strengths: Strengths) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(pack(strengths))),
        }
    }

    /// Current pair
    pub fn load(&self) -> Strengths {
        self.snapshot().1
    }

    /// Current pair with its packed form, for cheap change detection in the
    /// callback
    pub(crate) fn snapshot(&self) -> (u64, Strengths) {
        let bits = self.bits.load(Ordering::Acquire);
        let (mono, cancel) = unpack(bits);
        // Only validated pairs are ever stored
        (bits, Strengths::new(mono, cancel).unwrap_or_default())
    }

    pub fn store(&self, strengths: Strengths) {
        self.bits.store(pack(strengths), Ordering::Release);
        debug!("Strengths set to {}", strengths);
    }

    /// Replace the mono strength, keeping the cancellation strength.
    ///
    /// Rejected (and nothing changes) if the result would zero both.
    pub fn set_mono(&self, mono: i32) -> Result<Strengths> {
        self.update(|current| current.with_mono(mono))
    }

    /// Replace the cancellation strength, keeping the mono strength.
    ///
    /// Rejected (and nothing changes) if the result would zero both.
    pub fn set_cancel(&self, cancel: i32) -> Result<Strengths> {
        self.update(|current| current.with_cancel(cancel))
    }

    /// Atomically derive a new pair from the current one.
    ///
    /// Retries if another thread stored in between, so concurrent setters
    /// never overwrite each other's change.
    fn update(&self, change: impl Fn(Strengths) -> Result<Strengths>) -> Result<Strengths> {
        let mut last = None;
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let (mono, cancel) = unpack(bits);
                let result = change(Strengths::new(mono, cancel).unwrap_or_default());
                let next = result.as_ref().ok().copied().map(pack);
                last = Some(result);
                next
            });

        // The closure runs at least once; a rejection leaves the bits untouched
        let updated = last.unwrap_or_else(|| Ok(self.load()))?;
        debug!("Strengths set to {}", updated);
        Ok(updated)
    }
}
