//! Audio callback monitor
//!
//! The callback may not log, allocate, or lock. It records what happened in
//! atomics here; the main thread polls and does the logging.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{error, info};

/// Snapshot of callback activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackStats {
    /// Total callback invocations
    pub callback_count: u64,

    /// Total stereo frames taken from the source
    pub frames_produced: u64,

    /// Callbacks that were filled partly or wholly with silence
    pub silent_callbacks: u64,

    /// Source ran out of frames
    pub exhausted: bool,

    /// Stream errors reported by the device
    pub stream_errors: u64,
}

/// Lock-free callback activity counters.
///
/// **Thread Safety:** `record_*` methods are real-time safe; `poll` and
/// `stats` are for the main thread.
#[derive(Debug, Default)]
pub struct CallbackMonitor {
    callback_count: AtomicU64,
    frames_produced: AtomicU64,
    silent_callbacks: AtomicU64,
    exhausted: AtomicBool,
    stream_errors: AtomicU64,

    // Main-thread bookkeeping so each condition is logged once
    exhaustion_reported: AtomicBool,
    errors_reported: AtomicU64,
}

impl CallbackMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one callback invocation (call once per device buffer).
    ///
    /// **REAL-TIME SAFE**: atomic operations only
    pub fn record_callback(&self, frames_requested: usize, frames_written: usize) {
        self.callback_count.fetch_add(1, Ordering::Relaxed);
        self.frames_produced
            .fetch_add(frames_written as u64, Ordering::Relaxed);
        if frames_written < frames_requested {
            self.silent_callbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record that the source has no frames left.
    ///
    /// **REAL-TIME SAFE**: atomic operations only
    pub fn record_exhausted(&self) {
        self.exhausted.store(true, Ordering::Release);
    }

    /// Record an error reported by the output stream.
    pub fn record_stream_error(&self) {
        self.stream_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CallbackStats {
        CallbackStats {
            callback_count: self.callback_count.load(Ordering::Relaxed),
            frames_produced: self.frames_produced.load(Ordering::Relaxed),
            silent_callbacks: self.silent_callbacks.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Acquire),
            stream_errors: self.stream_errors.load(Ordering::Relaxed),
        }
    }

    /// Log anything new since the last poll (called by the main thread).
    ///
    /// Returns the current stats. End of buffer is logged exactly once; each
    /// new batch of stream errors is logged once.
    pub fn poll(&self) -> CallbackStats {
        let stats = self.stats();

        if stats.exhausted && !self.exhaustion_reported.swap(true, Ordering::Relaxed) {
            info!(
                "End of buffer after {} frames ({} callbacks)",
                stats.frames_produced, stats.callback_count
            );
        }

        let reported = self.errors_reported.swap(stats.stream_errors, Ordering::Relaxed);
        if stats.stream_errors > reported {
            error!(
                "Audio stream reported {} error(s) ({} total)",
                stats.stream_errors - reported,
                stats.stream_errors
            );
        }

        stats
    }
}
