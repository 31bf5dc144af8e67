//! Scheduler abstraction for the negotiation retry loop.
//!
//! A repeating task does not run shell code itself. Each tick is delivered
//! back to the shell's event loop as a negotiation tick for the portal the
//! task was started for, so ticks never overlap other handlers.

use std::time::Duration;

use crate::ids::{PortalId, TaskId};

/// Starts and cancels repeating per-portal tasks.
pub trait Scheduler: Send + Sync {
    /// Starts a task that delivers a tick for `portal_id` every `interval`,
    /// the first one after a full interval.
    fn start_repeating(&self, portal_id: &PortalId, interval: Duration) -> TaskId;

    /// Stops the task. Cancelling an unknown or already cancelled task is a
    /// no-op.
    fn cancel(&self, task: TaskId);
}
