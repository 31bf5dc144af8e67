//! Reconciles back/forward navigation with the frame registry.
//!
//! The user may step back past the start of this session or onto entries whose
//! portal ids no longer exist. The stored id is tried first, then a frame
//! already showing the new location. When neither works the location is
//! reloaded rather than guessing at a frame.

use portalshell_core::error::ShellError;
use portalshell_core::ids::PortalId;
use portalshell_core::protocol::HistoryEntry;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::shell::Shell;

/// How a back/forward navigation was reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PopStateOutcome {
    /// The shell switched to the frame matching the location.
    Entered {
        /// The frame now current.
        portal_id: PortalId,
    },
    /// No frame matched; the location was reloaded.
    Reloaded,
}

impl Shell {
    /// Handles a back/forward navigation whose entry stored `state`.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::HistoryInconsistency` when the stored portal
    /// exists but shows a different address than the location. The shell is
    /// left as is; overriding the user's navigation would be worse.
    pub fn on_pop_state(&mut self, state: Option<&Value>) -> Result<PopStateOutcome, ShellError> {
        let location = self.navigation.location();
        let stored = HistoryEntry::portal_id_of(state);

        let target = match stored.as_ref().and_then(|id| self.registry.get(id)) {
            Some(frame) if frame.address == location => frame.portal_id.clone(),
            Some(frame) => {
                return Err(ShellError::HistoryInconsistency {
                    portal_id: frame.portal_id.clone(),
                    frame_address: frame.address.to_string(),
                    location: location.to_string(),
                });
            }
            None => match self.registry.find_by_address(&location) {
                Some(frame) => frame.portal_id.clone(),
                None => {
                    warn!(
                        location = %location,
                        stored = ?stored,
                        "no frame for location, reloading"
                    );
                    self.navigation.reload();
                    return Ok(PopStateOutcome::Reloaded);
                }
            },
        };

        self.enter_portal(&target, false, None)?;
        Ok(PopStateOutcome::Entered { portal_id: target })
    }
}
