//! Shell error types.
//!
//! Nothing here is fatal. Every variant describes a message or navigation the
//! shell logged and dropped, or a caller mistake it refused.

use thiserror::Error;

use crate::ids::{ContextHandle, PortalId};

/// Errors raised while decoding inter-context messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The message carries a `kind` this protocol does not define.
    #[error("unknown message kind: {0}")]
    UnknownKind(String),

    /// The `kind` is known but its fields do not match the schema.
    #[error("malformed {kind} message: {reason}")]
    Malformed {
        /// The message kind.
        kind: String,
        /// Why decoding failed.
        reason: String,
    },
}

/// Top-level shell error type.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A message arrived from a context that is not a registered frame.
    #[error("message from unregistered {0}")]
    UnknownOrigin(ContextHandle),

    /// A message was routed to a portal that does not exist.
    #[error("{0} not found")]
    UnknownTarget(PortalId),

    /// A transition was requested into a portal that does not exist.
    #[error("cannot enter unknown {0}")]
    UnknownPortal(PortalId),

    /// A background frame tried to take focus.
    #[error("portal-enter into {target} from non-current {sender}")]
    UnauthorizedTransition {
        /// The frame that sent the request.
        sender: PortalId,
        /// The frame it asked to enter.
        target: PortalId,
    },

    /// A history entry disagrees with the live location.
    #[error("history entry for {portal_id} expects {frame_address}, location is {location}")]
    HistoryInconsistency {
        /// The portal named by the history entry.
        portal_id: PortalId,
        /// That frame's current address.
        frame_address: String,
        /// The location the user navigated to.
        location: String,
    },

    /// An address could not be parsed or resolved.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An inbound message could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
