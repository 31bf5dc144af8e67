//! Window-type negotiation.
//!
//! A frame cannot receive its role until the world inside it has started
//! listening, and the shell cannot observe that moment. The negotiator
//! therefore re-announces the role on a fixed interval until the frame
//! reports `started`. `starting` replies do not stop the loop: the frame may
//! still be building the presence that consumes the role.

use std::sync::Arc;
use std::time::Duration;

use portalshell_core::host::FrameHost;
use portalshell_core::ids::TaskId;
use portalshell_core::protocol::{IdentityHint, OutboundMessage, WindowType};
use portalshell_core::scheduler::Scheduler;
use tracing::debug;

use crate::domain::frame::Frame;

/// Runs at most one announcement loop per frame.
pub struct Negotiator {
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
}

impl Negotiator {
    /// Creates a negotiator announcing every `interval`.
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>, interval: Duration) -> Self {
        Self {
            scheduler,
            interval,
        }
    }

    /// Starts the announcement loop for `frame`. Returns `false` if one is
    /// already running; a supplied `hint` still replaces the pending one.
    pub fn start(&self, frame: &mut Frame, hint: Option<IdentityHint>) -> bool {
        if hint.is_some() {
            frame.pending_hint = hint;
        }
        if frame.pending_negotiation.is_some() {
            debug!(portal_id = %frame.portal_id, "negotiation already in flight");
            return false;
        }
        let task = self
            .scheduler
            .start_repeating(&frame.portal_id, self.interval);
        frame.pending_negotiation = Some(task);
        debug!(portal_id = %frame.portal_id, ?task, "negotiation started");
        true
    }

    /// Starts negotiation again after a transition, unless the frame already
    /// acknowledged `role` and there is no new hint to deliver.
    pub fn renegotiate(
        &self,
        frame: &mut Frame,
        role: WindowType,
        hint: Option<IdentityHint>,
    ) -> bool {
        if frame.acknowledged_role == Some(role) && hint.is_none() {
            return false;
        }
        self.start(frame, hint)
    }

    /// Handles one tick of `task`: posts the role the frame holds right now.
    /// Ticks from a loop that has since been cancelled or replaced are
    /// ignored.
    pub fn announce(
        &self,
        frame: &mut Frame,
        task: TaskId,
        role: WindowType,
        host: &dyn FrameHost,
    ) -> bool {
        if frame.pending_negotiation != Some(task) {
            debug!(portal_id = %frame.portal_id, ?task, "stale negotiation tick");
            return false;
        }
        let identity_hint = match role {
            WindowType::Primary => frame.pending_hint.clone(),
            WindowType::Secondary => None,
        };
        frame.announced_role = Some(role);
        host.post(
            frame.context,
            &OutboundMessage::WindowTypeQuery {
                window_type: role,
                identity_hint,
            },
        );
        true
    }

    /// Stops the loop because the frame reported `started` while holding
    /// `role`. Returns `false` if no loop was running, or if the last
    /// announcement carried a role the frame no longer holds; the loop then
    /// keeps going so the frame learns its new role.
    pub fn acknowledge(&self, frame: &mut Frame, role: WindowType) -> bool {
        if frame.announced_role.is_some_and(|announced| announced != role) {
            debug!(portal_id = %frame.portal_id, announced = ?frame.announced_role, ?role, "started for a superseded role");
            return false;
        }
        let Some(task) = frame.pending_negotiation.take() else {
            return false;
        };
        self.scheduler.cancel(task);
        frame.acknowledged_role = frame.announced_role;
        frame.pending_hint = None;
        debug!(portal_id = %frame.portal_id, role = ?frame.acknowledged_role, "negotiation acknowledged");
        true
    }

    /// Stops the loop without recording an acknowledgment. Used when the
    /// frame's context is reloaded or the shell shuts down.
    pub fn abandon(&self, frame: &mut Frame) -> bool {
        let Some(task) = frame.pending_negotiation.take() else {
            return false;
        };
        self.scheduler.cancel(task);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portalshell_core::address::Address;
    use portalshell_core::ids::{ContextHandle, PortalId};
    use portalshell_test_support::{ManualScheduler, RecordingFrameHost};
    use serde_json::json;

    fn frame() -> Frame {
        Frame::new(
            PortalId::new("aaa"),
            ContextHandle(1),
            Address::parse("https://a.example/").unwrap(),
            0,
            Utc::now(),
        )
    }

    fn negotiator(scheduler: &Arc<ManualScheduler>) -> Negotiator {
        Negotiator::new(scheduler.clone(), Duration::from_millis(200))
    }

    #[test]
    fn test_start_is_idempotent_while_in_flight() {
        // Arrange
        let scheduler = Arc::new(ManualScheduler::new());
        let negotiator = negotiator(&scheduler);
        let mut frame = frame();

        // Act
        let first = negotiator.start(&mut frame, None);
        let second = negotiator.start(&mut frame, None);

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(scheduler.active_for(&frame.portal_id).len(), 1);
        let task = frame.pending_negotiation.unwrap();
        assert_eq!(scheduler.interval_of(task), Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_acknowledge_cancels_exactly_once() {
        let scheduler = Arc::new(ManualScheduler::new());
        let negotiator = negotiator(&scheduler);
        let mut frame = frame();
        negotiator.start(&mut frame, None);

        assert!(negotiator.acknowledge(&mut frame, WindowType::Primary));
        assert!(!negotiator.acknowledge(&mut frame, WindowType::Primary));

        assert_eq!(scheduler.cancelled().len(), 1);
        assert_eq!(scheduler.active_count(), 0);
        assert!(!frame.is_negotiating());
    }

    #[test]
    fn test_announce_posts_hint_only_to_primary() {
        // Arrange
        let scheduler = Arc::new(ManualScheduler::new());
        let negotiator = negotiator(&scheduler);
        let host = RecordingFrameHost::new();
        let mut frame = frame();
        let hint = IdentityHint(json!({ "name": "alice" }));
        negotiator.start(&mut frame, Some(hint.clone()));
        let task = frame.pending_negotiation.unwrap();

        // Act
        negotiator.announce(&mut frame, task, WindowType::Primary, &host);
        negotiator.announce(&mut frame, task, WindowType::Secondary, &host);

        // Assert
        let posted = host.posted_to(frame.context);
        assert_eq!(
            posted,
            vec![
                OutboundMessage::WindowTypeQuery {
                    window_type: WindowType::Primary,
                    identity_hint: Some(hint),
                },
                OutboundMessage::WindowTypeQuery {
                    window_type: WindowType::Secondary,
                    identity_hint: None,
                },
            ]
        );
    }

    #[test]
    fn test_announce_ignores_stale_task() {
        let scheduler = Arc::new(ManualScheduler::new());
        let negotiator = negotiator(&scheduler);
        let host = RecordingFrameHost::new();
        let mut frame = frame();
        negotiator.start(&mut frame, None);
        let task = frame.pending_negotiation.unwrap();
        negotiator.acknowledge(&mut frame, WindowType::Primary);

        let announced = negotiator.announce(&mut frame, task, WindowType::Primary, &host);

        assert!(!announced);
        assert!(host.posted_to(frame.context).is_empty());
    }

    #[test]
    fn test_renegotiate_skips_unchanged_acknowledged_role() {
        // Arrange
        let scheduler = Arc::new(ManualScheduler::new());
        let negotiator = negotiator(&scheduler);
        let host = RecordingFrameHost::new();
        let mut frame = frame();
        negotiator.start(&mut frame, None);
        let task = frame.pending_negotiation.unwrap();
        negotiator.announce(&mut frame, task, WindowType::Secondary, &host);
        negotiator.acknowledge(&mut frame, WindowType::Secondary);

        // Act
        let same = negotiator.renegotiate(&mut frame, WindowType::Secondary, None);
        let flipped = negotiator.renegotiate(&mut frame, WindowType::Primary, None);

        // Assert
        assert!(!same);
        assert!(flipped);
        assert_eq!(scheduler.start_count(&frame.portal_id), 2);
    }

    #[test]
    fn test_acknowledge_for_superseded_role_keeps_loop_running() {
        // Arrange
        let scheduler = Arc::new(ManualScheduler::new());
        let negotiator = negotiator(&scheduler);
        let host = RecordingFrameHost::new();
        let mut frame = frame();
        negotiator.start(&mut frame, None);
        let task = frame.pending_negotiation.unwrap();
        negotiator.announce(&mut frame, task, WindowType::Primary, &host);

        // Act
        let stale = negotiator.acknowledge(&mut frame, WindowType::Secondary);
        negotiator.announce(&mut frame, task, WindowType::Secondary, &host);
        let fresh = negotiator.acknowledge(&mut frame, WindowType::Secondary);

        // Assert
        assert!(!stale);
        assert!(fresh);
        assert_eq!(frame.acknowledged_role(), Some(WindowType::Secondary));
        assert_eq!(scheduler.cancelled(), vec![task]);
    }
}
