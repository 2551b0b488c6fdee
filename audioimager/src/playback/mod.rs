//! Playback session, shared strength control, and callback monitoring

pub mod control;
pub mod monitor;
pub mod session;

pub use control::StrengthControl;
pub use monitor::{CallbackMonitor, CallbackStats};
pub use session::{FrameSource, PlaybackSession, SessionState};
