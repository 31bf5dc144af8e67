//! Portal transitions: changing which frame is current.

use portalshell_core::error::ShellError;
use portalshell_core::ids::PortalId;
use portalshell_core::protocol::{HistoryEntry, IdentityHint, WindowType};
use tracing::info;

use super::shell::Shell;

impl Shell {
    /// Makes `target` the current frame.
    ///
    /// The outgoing frame drops below every other frame and `target` moves to
    /// the top. With `record_history` a history entry for `target` is pushed.
    /// Both frames then renegotiate their roles; `hint` goes to `target`.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::UnknownPortal` if `target` is not registered. The
    /// shell is left untouched in that case.
    pub fn enter_portal(
        &mut self,
        target: &PortalId,
        record_history: bool,
        hint: Option<IdentityHint>,
    ) -> Result<(), ShellError> {
        if !self.registry.contains(target) {
            return Err(ShellError::UnknownPortal(target.clone()));
        }
        let outgoing = self.current.clone();

        self.registry
            .promote(target, &outgoing, self.frames.as_ref());

        let now = self.clock.now();
        if let Some(frame) = self.registry.get_mut(target) {
            if record_history {
                self.navigation.push_entry(&HistoryEntry {
                    portal_id: target.clone(),
                    address: frame.address.clone(),
                });
            }
            self.current = target.clone();
            frame.last_entered_at = Some(now);
            self.frames.focus(frame.context);
        }

        if outgoing != *target {
            if let Some(frame) = self.registry.get_mut(&outgoing) {
                self.negotiator
                    .renegotiate(frame, WindowType::Secondary, None);
            }
        }
        if let Some(frame) = self.registry.get_mut(target) {
            self.negotiator
                .renegotiate(frame, WindowType::Primary, hint);
        }

        info!(from = %outgoing, to = %target, record_history, "entered portal");
        Ok(())
    }
}
