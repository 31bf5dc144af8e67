//! A child context hosting one running world.

use chrono::{DateTime, Utc};
use portalshell_core::address::Address;
use portalshell_core::ids::{ContextHandle, PortalId, TaskId};
use portalshell_core::protocol::{IdentityHint, WindowType};

/// One isolated child context and the shell's bookkeeping about it.
#[derive(Debug)]
pub struct Frame {
    /// Unique, immutable identifier.
    pub portal_id: PortalId,
    /// Host handle the context's messages arrive with.
    pub context: ContextHandle,
    /// Location currently loaded in the context.
    pub(crate) address: Address,
    /// Paint order; the current frame holds the maximum.
    pub(crate) stack_order: i32,
    /// Active role announcement loop, if any.
    pub(crate) pending_negotiation: Option<TaskId>,
    /// Identity hint carried by the active loop.
    pub(crate) pending_hint: Option<IdentityHint>,
    /// Role sent by the most recent announcement.
    pub(crate) announced_role: Option<WindowType>,
    /// Role in effect when the frame reported `started`.
    pub(crate) acknowledged_role: Option<WindowType>,
    /// When the context was created.
    pub created_at: DateTime<Utc>,
    /// When the frame last became current.
    pub(crate) last_entered_at: Option<DateTime<Utc>>,
}

impl Frame {
    /// Creates the bookkeeping for a freshly created context.
    #[must_use]
    pub fn new(
        portal_id: PortalId,
        context: ContextHandle,
        address: Address,
        stack_order: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            portal_id,
            context,
            address,
            stack_order,
            pending_negotiation: None,
            pending_hint: None,
            announced_role: None,
            acknowledged_role: None,
            created_at,
            last_entered_at: None,
        }
    }

    /// Returns the location loaded in the context.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the paint order.
    #[must_use]
    pub fn stack_order(&self) -> i32 {
        self.stack_order
    }

    /// Returns `true` while the frame has not yet acknowledged its role.
    #[must_use]
    pub fn is_negotiating(&self) -> bool {
        self.pending_negotiation.is_some()
    }

    /// Returns the role the frame acknowledged last.
    #[must_use]
    pub fn acknowledged_role(&self) -> Option<WindowType> {
        self.acknowledged_role
    }

    /// Returns when the frame last became current.
    #[must_use]
    pub fn last_entered_at(&self) -> Option<DateTime<Utc>> {
        self.last_entered_at
    }
}
