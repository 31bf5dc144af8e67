//! Read-only snapshots of shell state for inspection surfaces.

use chrono::{DateTime, Utc};
use portalshell_core::address::Address;
use portalshell_core::ids::{ContextHandle, PortalId};
use portalshell_core::protocol::WindowType;
use serde::Serialize;

use super::shell::Shell;
use crate::domain::frame::Frame;

/// Read-only view of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    /// Frame identifier.
    pub portal_id: PortalId,
    /// Host context the frame lives in.
    pub context: ContextHandle,
    /// Location loaded in the frame.
    pub address: Address,
    /// Paint order; higher paints on top.
    pub stack_order: i32,
    /// Whether this is the current frame.
    pub current: bool,
    /// Whether a role announcement loop is running.
    pub negotiating: bool,
    /// Role the frame last confirmed with `started`.
    pub acknowledged_role: Option<WindowType>,
    /// When the frame was created.
    pub created_at: DateTime<Utc>,
    /// When the frame last became current.
    pub last_entered_at: Option<DateTime<Utc>>,
}

impl FrameView {
    fn of(frame: &Frame, current: &PortalId) -> Self {
        Self {
            portal_id: frame.portal_id.clone(),
            context: frame.context,
            address: frame.address().clone(),
            stack_order: frame.stack_order(),
            current: frame.portal_id == *current,
            negotiating: frame.is_negotiating(),
            acknowledged_role: frame.acknowledged_role(),
            created_at: frame.created_at,
            last_entered_at: frame.last_entered_at(),
        }
    }
}

/// Read-only view of the whole shell. Frames are listed in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSnapshot {
    /// Id of the current frame.
    pub current: PortalId,
    /// Every frame.
    pub frames: Vec<FrameView>,
}

impl Shell {
    /// Captures the current state of every frame.
    #[must_use]
    pub fn snapshot(&self) -> ShellSnapshot {
        ShellSnapshot {
            current: self.current.clone(),
            frames: self
                .registry
                .iter()
                .map(|frame| FrameView::of(frame, &self.current))
                .collect(),
        }
    }

    /// Captures one frame, if it exists.
    #[must_use]
    pub fn frame_view(&self, portal_id: &PortalId) -> Option<FrameView> {
        self.registry
            .get(portal_id)
            .map(|frame| FrameView::of(frame, &self.current))
    }
}
