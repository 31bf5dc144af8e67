//! Message router.
//!
//! Inbound messages are attributed to the frame whose context posted them and
//! dispatched by kind. Anything that cannot be attributed or decoded is
//! reported as an error and dropped by the event loop.

use portalshell_core::address::Address;
use portalshell_core::error::ShellError;
use portalshell_core::ids::{ContextHandle, PortalId};
use portalshell_core::protocol::{
    IdentityHint, InboundMessage, OutboundMessage, PortalUpdate, kind_of,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::shell::Shell;

/// What the router did with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RouteOutcome {
    /// The value was not a protocol message.
    Ignored,
    /// `starting` was noted; negotiation continues.
    Starting {
        /// The sender.
        portal_id: PortalId,
    },
    /// `started` was received.
    Started {
        /// The sender.
        portal_id: PortalId,
        /// Whether a pending negotiation was cancelled.
        cancelled: bool,
    },
    /// An existing frame was pointed at a new address.
    Retargeted {
        /// The retargeted frame.
        portal_id: PortalId,
    },
    /// The requester was told which frame shows the requested world.
    Opened {
        /// The frame showing the world.
        portal_id: PortalId,
        /// Whether the frame was created for this request.
        created: bool,
    },
    /// A view update was forwarded.
    Forwarded {
        /// The receiving frame.
        portal_id: PortalId,
    },
    /// A view update aimed at the current frame was withheld.
    Suppressed {
        /// The frame that would have received it.
        portal_id: PortalId,
    },
    /// The sender handed focus to another frame.
    Entered {
        /// The frame now current.
        portal_id: PortalId,
    },
}

impl Shell {
    /// Routes a raw message posted by the context `origin`.
    ///
    /// # Errors
    ///
    /// - `ShellError::UnknownOrigin` if `origin` is not a registered frame.
    /// - `ShellError::Protocol` if the message kind is unknown or malformed.
    /// - `ShellError::UnknownTarget` for a retarget or update naming a
    ///   missing portal.
    /// - `ShellError::UnauthorizedTransition` for `portal-enter` from a
    ///   background frame.
    /// - `ShellError::InvalidAddress` if a `load-world` address cannot be
    ///   resolved.
    pub fn receive_from_context(
        &mut self,
        origin: ContextHandle,
        raw: &Value,
    ) -> Result<RouteOutcome, ShellError> {
        if kind_of(raw).is_none() {
            return Ok(RouteOutcome::Ignored);
        }
        let sender = self
            .registry
            .find_by_context(origin)
            .map(|frame| frame.portal_id.clone())
            .ok_or(ShellError::UnknownOrigin(origin))?;
        let Some(message) = InboundMessage::decode(raw)? else {
            return Ok(RouteOutcome::Ignored);
        };
        debug!(from = %sender, kind = message.kind(), "message from portal");

        match message {
            InboundMessage::Starting => Ok(RouteOutcome::Starting { portal_id: sender }),
            InboundMessage::Started => Ok(self.on_started(sender)),
            InboundMessage::LoadWorld { address, portal_id } => {
                self.on_load_world(&sender, &address, portal_id)
            }
            InboundMessage::PortalUpdate(update) => self.on_portal_update(update),
            InboundMessage::PortalEnter {
                portal_id,
                identity_hint,
            } => self.on_portal_enter(sender, portal_id, identity_hint),
        }
    }

    fn on_started(&mut self, sender: PortalId) -> RouteOutcome {
        let role = self.role_of(&sender);
        let cancelled = match self.registry.get_mut(&sender) {
            Some(frame) => self.negotiator.acknowledge(frame, role),
            None => false,
        };
        RouteOutcome::Started {
            portal_id: sender,
            cancelled,
        }
    }

    fn on_load_world(
        &mut self,
        sender: &PortalId,
        raw_address: &str,
        portal_id: Option<PortalId>,
    ) -> Result<RouteOutcome, ShellError> {
        let address = self.navigation.location().resolve(raw_address)?;

        if let Some(portal_id) = portal_id {
            self.retarget(&portal_id, address)?;
            return Ok(RouteOutcome::Retargeted { portal_id });
        }

        let (portal_id, created) = match self.registry.find_by_address(&address) {
            Some(frame) => (frame.portal_id.clone(), false),
            None => (self.create_frame(address.clone()), true),
        };
        self.send_to_portal(
            sender,
            &OutboundMessage::PortalOpened {
                portal_id: portal_id.clone(),
                address,
            },
        )?;
        Ok(RouteOutcome::Opened { portal_id, created })
    }

    /// Points an existing frame at a new address. The reloaded context has
    /// lost its role, so negotiation starts over.
    fn retarget(&mut self, portal_id: &PortalId, address: Address) -> Result<(), ShellError> {
        let frame = self
            .registry
            .get_mut(portal_id)
            .ok_or_else(|| ShellError::UnknownTarget(portal_id.clone()))?;
        info!(portal_id = %portal_id, address = %address, "retargeting frame");
        self.frames.load(frame.context, &address);
        frame.address = address;
        frame.acknowledged_role = None;
        self.negotiator.abandon(frame);
        self.negotiator.start(frame, None);
        Ok(())
    }

    fn on_portal_update(&mut self, update: PortalUpdate) -> Result<RouteOutcome, ShellError> {
        let carries_view_state = update.touches_any(&self.config.view_state_fields);
        let target = update.portal_id;
        if target == self.current && carries_view_state {
            debug!(to = %target, "view update for current portal suppressed");
            return Ok(RouteOutcome::Suppressed { portal_id: target });
        }
        self.send_to_portal(&target, &OutboundMessage::PortalUpdate(update.payload))?;
        Ok(RouteOutcome::Forwarded { portal_id: target })
    }

    fn on_portal_enter(
        &mut self,
        sender: PortalId,
        target: PortalId,
        hint: Option<IdentityHint>,
    ) -> Result<RouteOutcome, ShellError> {
        if sender != self.current {
            return Err(ShellError::UnauthorizedTransition { sender, target });
        }
        self.enter_portal(&target, true, hint)?;
        Ok(RouteOutcome::Entered { portal_id: target })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::shell::ShellPorts;
    use crate::config::ShellConfig;
    use portalshell_core::error::ProtocolError;
    use portalshell_core::protocol::WindowType;
    use portalshell_test_support::{
        FixedClock, ManualScheduler, MockRng, RecordingFrameHost, RecordingNavigation,
    };
    use serde_json::json;

    struct Fixture {
        shell: Shell,
        host: Arc<RecordingFrameHost>,
        scheduler: Arc<ManualScheduler>,
    }

    fn fixture() -> Fixture {
        let host = Arc::new(RecordingFrameHost::new());
        let scheduler = Arc::new(ManualScheduler::new());
        let navigation = Arc::new(RecordingNavigation::at("https://worlds.example/lobby"));
        let shell = Shell::start(
            ShellConfig::default(),
            ShellPorts {
                frames: host.clone(),
                navigation,
                scheduler: scheduler.clone(),
                clock: Arc::new(FixedClock::at_test_epoch()),
                rng: Box::new(MockRng::default()),
            },
        );
        Fixture {
            shell,
            host,
            scheduler,
        }
    }

    fn context_of(shell: &Shell, portal_id: &PortalId) -> ContextHandle {
        shell.registry().get(portal_id).unwrap().context
    }

    #[test]
    fn test_message_from_unknown_origin_is_rejected() {
        let mut f = fixture();

        let result = f
            .shell
            .receive_from_context(ContextHandle(42), &json!({ "kind": "started" }));

        match result {
            Err(ShellError::UnknownOrigin(handle)) => assert_eq!(handle, ContextHandle(42)),
            other => panic!("expected UnknownOrigin, got {other:?}"),
        }
    }

    #[test]
    fn test_foreign_traffic_is_ignored_even_from_unknown_origin() {
        let mut f = fixture();

        let outcome = f
            .shell
            .receive_from_context(ContextHandle(42), &json!({ "type": "resize" }))
            .unwrap();

        assert_eq!(outcome, RouteOutcome::Ignored);
    }

    #[test]
    fn test_unknown_kind_is_reported_not_fatal() {
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);

        let result = f
            .shell
            .receive_from_context(origin, &json!({ "kind": "teleport" }));

        match result {
            Err(ShellError::Protocol(ProtocolError::UnknownKind(kind))) => {
                assert_eq!(kind, "teleport");
            }
            other => panic!("expected UnknownKind, got {other:?}"),
        }
        assert_eq!(f.shell.current(), &current);
    }

    #[test]
    fn test_starting_keeps_negotiation_running_and_started_stops_it() {
        // Arrange
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);

        // Act
        let starting = f
            .shell
            .receive_from_context(origin, &json!({ "kind": "starting" }))
            .unwrap();
        let still_active = f.scheduler.active_for(&current).len();
        let started = f
            .shell
            .receive_from_context(origin, &json!({ "kind": "started" }))
            .unwrap();
        let again = f
            .shell
            .receive_from_context(origin, &json!({ "kind": "started" }))
            .unwrap();

        // Assert
        assert_eq!(starting, RouteOutcome::Starting { portal_id: current.clone() });
        assert_eq!(still_active, 1);
        assert_eq!(
            started,
            RouteOutcome::Started { portal_id: current.clone(), cancelled: true }
        );
        assert_eq!(
            again,
            RouteOutcome::Started { portal_id: current.clone(), cancelled: false }
        );
        assert!(f.scheduler.active_for(&current).is_empty());
        assert_eq!(f.scheduler.cancelled().len(), 1);
    }

    #[test]
    fn test_load_world_resolves_relative_address_and_replies() {
        // Arrange
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);

        // Act
        let outcome = f
            .shell
            .receive_from_context(origin, &json!({ "kind": "load-world", "address": "garden" }))
            .unwrap();

        // Assert
        let RouteOutcome::Opened { portal_id, created } = outcome else {
            panic!("expected Opened, got {outcome:?}");
        };
        assert!(created);
        let frame = f.shell.registry().get(&portal_id).unwrap();
        assert_eq!(frame.address().as_str(), "https://worlds.example/garden");
        assert!(frame.is_negotiating());
        assert_eq!(
            f.host.posted_to(origin),
            vec![OutboundMessage::PortalOpened {
                portal_id,
                address: Address::parse("https://worlds.example/garden").unwrap(),
            }]
        );
    }

    #[test]
    fn test_load_world_with_portal_id_retargets_in_place() {
        // Arrange
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);
        let target = f
            .shell
            .create_frame(Address::parse("https://worlds.example/a").unwrap());
        let target_context = context_of(&f.shell, &target);
        f.shell
            .receive_from_context(target_context, &json!({ "kind": "started" }))
            .unwrap();

        // Act
        let outcome = f
            .shell
            .receive_from_context(
                origin,
                &json!({ "kind": "load-world", "address": "b", "portalId": target.as_str() }),
            )
            .unwrap();

        // Assert
        assert_eq!(outcome, RouteOutcome::Retargeted { portal_id: target.clone() });
        assert_eq!(f.shell.registry().len(), 2);
        let frame = f.shell.registry().get(&target).unwrap();
        assert_eq!(frame.address().as_str(), "https://worlds.example/b");
        assert!(frame.is_negotiating());
        assert_eq!(
            f.host.loads(),
            vec![(target_context, Address::parse("https://worlds.example/b").unwrap())]
        );
        assert!(f.host.posted_to(origin).is_empty());
    }

    #[test]
    fn test_load_world_retarget_of_unknown_portal_is_rejected() {
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);

        let result = f.shell.receive_from_context(
            origin,
            &json!({ "kind": "load-world", "address": "b", "portalId": "nope" }),
        );

        match result {
            Err(ShellError::UnknownTarget(id)) => assert_eq!(id, PortalId::new("nope")),
            other => panic!("expected UnknownTarget, got {other:?}"),
        }
    }

    #[test]
    fn test_portal_update_from_background_to_current_is_suppressed() {
        // Arrange
        let mut f = fixture();
        let current = f.shell.current().clone();
        let background = f
            .shell
            .create_frame(Address::parse("https://worlds.example/a").unwrap());
        let origin = context_of(&f.shell, &background);

        // Act
        let outcome = f
            .shell
            .receive_from_context(
                origin,
                &json!({
                    "kind": "portal-update",
                    "portalId": current.as_str(),
                    "cameraMatrix": [1, 0, 0, 1]
                }),
            )
            .unwrap();

        // Assert
        assert_eq!(outcome, RouteOutcome::Suppressed { portal_id: current.clone() });
        let current_context = context_of(&f.shell, &current);
        assert!(
            f.host
                .posted_to(current_context)
                .iter()
                .all(|m| !matches!(m, OutboundMessage::PortalUpdate(_)))
        );
    }

    #[test]
    fn test_portal_update_without_view_state_reaches_current() {
        let mut f = fixture();
        let current = f.shell.current().clone();
        let background = f
            .shell
            .create_frame(Address::parse("https://worlds.example/a").unwrap());
        let origin = context_of(&f.shell, &background);

        let outcome = f
            .shell
            .receive_from_context(
                origin,
                &json!({ "kind": "portal-update", "portalId": current.as_str(), "label": "hi" }),
            )
            .unwrap();

        assert_eq!(outcome, RouteOutcome::Forwarded { portal_id: current });
    }

    #[test]
    fn test_portal_update_from_current_is_forwarded_without_routing_field() {
        // Arrange
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);
        let background = f
            .shell
            .create_frame(Address::parse("https://worlds.example/a").unwrap());
        let background_context = context_of(&f.shell, &background);

        // Act
        let outcome = f
            .shell
            .receive_from_context(
                origin,
                &json!({
                    "kind": "portal-update",
                    "portalId": background.as_str(),
                    "cameraMatrix": [1, 2, 3]
                }),
            )
            .unwrap();

        // Assert
        assert_eq!(outcome, RouteOutcome::Forwarded { portal_id: background });
        let updates: Vec<Value> = f
            .host
            .posted_to(background_context)
            .into_iter()
            .filter(|m| matches!(m, OutboundMessage::PortalUpdate(_)))
            .map(|m| m.to_value())
            .collect();
        assert_eq!(
            updates,
            vec![json!({ "kind": "portal-update", "cameraMatrix": [1, 2, 3] })]
        );
    }

    #[test]
    fn test_portal_update_to_unknown_portal_is_rejected() {
        let mut f = fixture();
        let current = f.shell.current().clone();
        let origin = context_of(&f.shell, &current);

        let result = f.shell.receive_from_context(
            origin,
            &json!({ "kind": "portal-update", "portalId": "ghost", "label": "x" }),
        );

        assert!(matches!(result, Err(ShellError::UnknownTarget(_))));
    }

    #[test]
    fn test_portal_enter_from_background_is_unauthorized() {
        // Arrange
        let mut f = fixture();
        let current = f.shell.current().clone();
        let background = f
            .shell
            .create_frame(Address::parse("https://worlds.example/a").unwrap());
        let origin = context_of(&f.shell, &background);

        // Act
        let result = f.shell.receive_from_context(
            origin,
            &json!({ "kind": "portal-enter", "portalId": background.as_str() }),
        );

        // Assert
        match result {
            Err(ShellError::UnauthorizedTransition { sender, target }) => {
                assert_eq!(sender, background);
                assert_eq!(target, background);
            }
            other => panic!("expected UnauthorizedTransition, got {other:?}"),
        }
        assert_eq!(f.shell.current(), &current);
        assert_eq!(f.shell.role_of(&background), WindowType::Secondary);
    }
}
