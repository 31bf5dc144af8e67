//! Answering "what role am I" from inside a frame.
//!
//! The shell repeats `window-type-query` until the world reports `started`.
//! `RoleListener` handles those queries as they arrive from the parent and
//! publishes the latest assignment; any number of `RoleQuery` clones can wait
//! for it.

use std::sync::Arc;

use portalshell_core::protocol::{
    IdentityHint, InboundMessage, OutboundMessage, WINDOW_TYPE_QUERY_KIND, WindowType, kind_of,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::error::EmbedError;
use crate::link::ParentLink;

/// The role this program plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowRole {
    /// Running at top level; this program is the shell.
    Shell,
    /// The frame currently shown and interactive.
    Primary,
    /// Loaded but in the background.
    Secondary,
}

impl From<WindowType> for WindowRole {
    fn from(window_type: WindowType) -> Self {
        match window_type {
            WindowType::Primary => Self::Primary,
            WindowType::Secondary => Self::Secondary,
        }
    }
}

/// The latest role announcement received from the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAssignment {
    /// Role this window holds.
    pub role: WindowRole,
    /// Who the user is, sent only with a primary announcement.
    pub identity_hint: Option<IdentityHint>,
}

/// Creates a listener fed by parent messages and a query that waits on it.
pub fn role_channel(link: Arc<dyn ParentLink>) -> (RoleListener, RoleQuery) {
    let embedded = link.is_embedded();
    let (tx, rx) = watch::channel(None);
    (RoleListener { link, tx }, RoleQuery { embedded, rx })
}

/// Handles `window-type-query` messages from the parent.
pub struct RoleListener {
    link: Arc<dyn ParentLink>,
    tx: watch::Sender<Option<RoleAssignment>>,
}

impl RoleListener {
    /// Handles one raw message from the parent. Returns the announced role,
    /// or `None` for any other traffic.
    ///
    /// Every query is answered with `starting`. The overlay tracks whether
    /// this frame is current and a primary frame takes focus.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::Protocol` if a `window-type-query` is malformed.
    pub fn on_parent_message(&self, raw: &Value) -> Result<Option<WindowRole>, EmbedError> {
        if kind_of(raw) != Some(WINDOW_TYPE_QUERY_KIND) {
            return Ok(None);
        }
        let Some(OutboundMessage::WindowTypeQuery {
            window_type,
            identity_hint,
        }) = OutboundMessage::decode(raw)?
        else {
            return Ok(None);
        };

        let role = WindowRole::from(window_type);
        self.link.post_to_parent(&InboundMessage::Starting);
        self.link.set_overlay_current(role == WindowRole::Primary);
        if role == WindowRole::Primary {
            self.link.focus();
        }
        debug!(?role, "window type announced");
        self.tx.send_replace(Some(RoleAssignment {
            role,
            identity_hint,
        }));
        Ok(Some(role))
    }
}

/// Waits for the role the parent assigns.
#[derive(Clone)]
pub struct RoleQuery {
    embedded: bool,
    rx: watch::Receiver<Option<RoleAssignment>>,
}

impl RoleQuery {
    /// Returns this program's role, waiting for the first announcement when
    /// embedded.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::ListenerClosed` if the listener is dropped before
    /// any role arrives.
    pub async fn window_role(&mut self) -> Result<WindowRole, EmbedError> {
        Ok(self.assignment().await?.role)
    }

    /// Like [`RoleQuery::window_role`], including the identity hint.
    ///
    /// # Errors
    ///
    /// Same as [`RoleQuery::window_role`].
    pub async fn assignment(&mut self) -> Result<RoleAssignment, EmbedError> {
        if !self.embedded {
            return Ok(RoleAssignment {
                role: WindowRole::Shell,
                identity_hint: None,
            });
        }
        let assignment = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| EmbedError::ListenerClosed)?;
        assignment.clone().ok_or(EmbedError::ListenerClosed)
    }

    /// Returns the latest assignment without waiting.
    #[must_use]
    pub fn latest(&self) -> Option<RoleAssignment> {
        self.rx.borrow().clone()
    }
}
