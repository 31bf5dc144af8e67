//! The port an embedded world uses to reach its parent shell.

use portalshell_core::protocol::InboundMessage;

/// Connection from a framed world to the shell that hosts it.
pub trait ParentLink: Send + Sync {
    /// Returns `true` when running inside a shell frame.
    fn is_embedded(&self) -> bool;

    /// Posts `message` to the parent shell. Fire-and-forget.
    fn post_to_parent(&self, message: &InboundMessage);

    /// Shows or hides the overlay's "current world" state.
    fn set_overlay_current(&self, current: bool);

    /// Takes input focus.
    fn focus(&self);
}
