//! Errors raised on the embedded side.

use portalshell_core::error::ProtocolError;

/// Errors from role queries and parent messaging.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// There is no parent shell to talk to.
    #[error("not embedded in a shell")]
    NotEmbedded,

    /// The listener was dropped before any role arrived.
    #[error("role listener closed before a role was assigned")]
    ListenerClosed,

    /// The parent sent a message that could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
