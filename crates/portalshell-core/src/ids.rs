//! Identifiers shared between the shell, its hosts, and embedded frames.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicRng;

/// Number of base-36 characters in a generated portal identifier.
pub const PORTAL_ID_LEN: usize = 13;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque, unique token naming one frame for the lifetime of the shell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortalId(String);

impl PortalId {
    /// Wraps an existing token, e.g. one read back from a history entry.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Draws a fresh random token. Uniqueness against live frames is the
    /// caller's job; see `FrameRegistry::create_frame`.
    #[must_use]
    pub fn generate(rng: &mut dyn DeterministicRng) -> Self {
        let id = (0..PORTAL_ID_LEN)
            .map(|_| {
                let idx = rng.next_u32_range(0, 35) as usize;
                char::from(BASE36[idx])
            })
            .collect();
        Self(id)
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "portal-{}", self.0)
    }
}

/// Host-assigned handle for an isolated child context. Inbound messages carry
/// the handle of the context that posted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextHandle(pub u64);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context-{}", self.0)
    }
}

/// Handle for a scheduled repeating task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);
