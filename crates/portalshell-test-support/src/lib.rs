//! Shared test doubles for the portal shell.

mod clock;
mod frame_host;
mod navigation;
mod rng;
mod scheduler;

pub use clock::FixedClock;
pub use frame_host::RecordingFrameHost;
pub use navigation::RecordingNavigation;
pub use rng::{MockRng, SequenceRng};
pub use scheduler::ManualScheduler;
