//! Requests an embedded world sends to its shell.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use portalshell_core::ids::PortalId;
use portalshell_core::protocol::{IdentityHint, InboundMessage, PortalUpdate};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::EmbedError;
use crate::link::ParentLink;

/// Sends child-to-shell messages over a [`ParentLink`].
pub struct ParentClient {
    link: Arc<dyn ParentLink>,
    started: AtomicBool,
}

impl ParentClient {
    #[must_use]
    pub fn new(link: Arc<dyn ParentLink>) -> Self {
        Self {
            link,
            started: AtomicBool::new(false),
        }
    }

    /// Reports that the world has built its interactive presence. Only the
    /// first call posts anything; returns whether this call did.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::NotEmbedded` when there is no parent shell.
    pub fn started(&self) -> Result<bool, EmbedError> {
        self.ensure_embedded()?;
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("started already reported");
            return Ok(false);
        }
        self.link.post_to_parent(&InboundMessage::Started);
        info!("reported started to shell");
        Ok(true)
    }

    /// Asks the shell to open `address`, or to point `portal_id` at it.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::NotEmbedded` when there is no parent shell.
    pub fn load_world(
        &self,
        address: impl Into<String>,
        portal_id: Option<PortalId>,
    ) -> Result<(), EmbedError> {
        self.post(&InboundMessage::LoadWorld {
            address: address.into(),
            portal_id,
        })
    }

    /// Asks the shell to make `portal_id` current. The shell ignores this
    /// unless the sender is the current frame.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::NotEmbedded` when there is no parent shell.
    pub fn enter_portal(
        &self,
        portal_id: PortalId,
        identity_hint: Option<IdentityHint>,
    ) -> Result<(), EmbedError> {
        self.post(&InboundMessage::PortalEnter {
            portal_id,
            identity_hint,
        })
    }

    /// Sends a view-state update to another frame through the shell.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::NotEmbedded` when there is no parent shell.
    pub fn update_portal(
        &self,
        portal_id: PortalId,
        payload: Map<String, Value>,
    ) -> Result<(), EmbedError> {
        self.post(&InboundMessage::PortalUpdate(PortalUpdate { portal_id, payload }))
    }

    fn post(&self, message: &InboundMessage) -> Result<(), EmbedError> {
        self.ensure_embedded()?;
        debug!(kind = message.kind(), "message to shell");
        self.link.post_to_parent(message);
        Ok(())
    }

    fn ensure_embedded(&self) -> Result<(), EmbedError> {
        if self.link.is_embedded() {
            Ok(())
        } else {
            Err(EmbedError::NotEmbedded)
        }
    }
}
