//! Ports the shell drives on its host environment.
//!
//! The shell never touches a real window. It asks a `FrameHost` to create and
//! arrange child contexts and a `NavigationHost` to read and write the
//! navigation history. Both calls are fire-and-forget: delivery into a child
//! context is asynchronous and a host must never fail the caller.

use crate::address::Address;
use crate::ids::{ContextHandle, PortalId};
use crate::protocol::{HistoryEntry, OutboundMessage};

/// Creates, arranges, and messages isolated child contexts.
pub trait FrameHost: Send + Sync {
    /// Creates an inert, full-size child context showing `address` and returns
    /// the handle its messages will arrive with.
    fn create_context(&self, portal_id: &PortalId, address: &Address) -> ContextHandle;

    /// Points an existing context at a new address.
    fn load(&self, context: ContextHandle, address: &Address);

    /// Queues `message` for delivery into the context.
    fn post(&self, context: ContextHandle, message: &OutboundMessage);

    /// Sets the paint order of the context. Higher values paint on top.
    fn set_stack_order(&self, context: ContextHandle, order: i32);

    /// Gives the context input focus.
    fn focus(&self, context: ContextHandle);
}

/// Access to the outer navigation history.
pub trait NavigationHost: Send + Sync {
    /// Returns the currently displayed external location.
    fn location(&self) -> Address;

    /// Pushes a new entry and makes its address the displayed location.
    fn push_entry(&self, entry: &HistoryEntry);

    /// Replaces the active entry without growing the history.
    fn replace_entry(&self, entry: &HistoryEntry);

    /// Abandons all in-memory state and reloads the displayed location.
    fn reload(&self);
}
