//! The shell context object.
//!
//! A `Shell` is built once at startup and owned by a single event loop. Every
//! state change happens inside `Shell::handle`, which runs each event to
//! completion before the next one, so no handler ever sees a half-updated
//! registry.

use std::sync::Arc;

use portalshell_core::address::Address;
use portalshell_core::clock::Clock;
use portalshell_core::error::ShellError;
use portalshell_core::host::{FrameHost, NavigationHost};
use portalshell_core::ids::{ContextHandle, PortalId, TaskId};
use portalshell_core::protocol::{HistoryEntry, OutboundMessage, WindowType};
use portalshell_core::rng::DeterministicRng;
use portalshell_core::scheduler::Scheduler;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::history_sync::PopStateOutcome;
use super::negotiator::Negotiator;
use super::router::RouteOutcome;
use crate::config::ShellConfig;
use crate::domain::registry::FrameRegistry;

/// Everything the shell needs from its environment.
pub struct ShellPorts {
    /// Creates and arranges child contexts.
    pub frames: Arc<dyn FrameHost>,
    /// Reads and writes navigation history.
    pub navigation: Arc<dyn NavigationHost>,
    /// Runs the negotiation retry loops.
    pub scheduler: Arc<dyn Scheduler>,
    /// Timestamps frame lifecycle.
    pub clock: Arc<dyn Clock>,
    /// Draws portal ids.
    pub rng: Box<dyn DeterministicRng>,
}

/// Inputs to the shell's event loop.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// A child context posted `data`.
    Message {
        /// Handle of the posting context.
        origin: ContextHandle,
        /// The raw message.
        data: Value,
    },
    /// The user moved through history; `state` is the stored entry state.
    PopState {
        /// State recorded with the entry, if any.
        state: Option<Value>,
    },
    /// A negotiation loop fired.
    NegotiationTick {
        /// The portal the loop belongs to.
        portal_id: PortalId,
        /// The loop that fired.
        task: TaskId,
    },
    /// Explicit navigation to a world address.
    Navigate {
        /// Address, possibly relative to the current location.
        address: String,
    },
}

/// Result of a handled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ShellOutcome {
    /// A frame message was routed.
    Routed {
        /// What routing did.
        outcome: RouteOutcome,
    },
    /// A back/forward navigation was reconciled.
    PopState {
        /// How it was reconciled.
        outcome: PopStateOutcome,
    },
    /// A negotiation tick was processed.
    Tick {
        /// Whether a role announcement was posted.
        announced: bool,
    },
    /// Explicit navigation made a frame current.
    Navigated {
        /// The frame now current.
        portal_id: PortalId,
    },
}

/// The multi-context portal orchestrator.
pub struct Shell {
    pub(crate) config: ShellConfig,
    pub(crate) registry: FrameRegistry,
    pub(crate) current: PortalId,
    pub(crate) negotiator: Negotiator,
    pub(crate) frames: Arc<dyn FrameHost>,
    pub(crate) navigation: Arc<dyn NavigationHost>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) rng: Box<dyn DeterministicRng>,
}

impl Shell {
    /// Starts the shell: creates the frame for the current location, makes it
    /// current, and stamps the active history entry with its portal id.
    #[must_use]
    pub fn start(config: ShellConfig, ports: ShellPorts) -> Self {
        let ShellPorts {
            frames,
            navigation,
            scheduler,
            clock,
            mut rng,
        } = ports;
        let negotiator = Negotiator::new(scheduler, config.negotiation_interval);
        let mut registry = FrameRegistry::new();

        let location = navigation.location();
        let current = registry.create_frame(
            location.clone(),
            rng.as_mut(),
            frames.as_ref(),
            clock.as_ref(),
        );
        if let Some(frame) = registry.get_mut(&current) {
            frame.last_entered_at = Some(clock.now());
            negotiator.start(frame, None);
        }
        navigation.replace_entry(&HistoryEntry {
            portal_id: current.clone(),
            address: location,
        });
        info!(portal_id = %current, "shell started");

        Self {
            config,
            registry,
            current,
            negotiator,
            frames,
            navigation,
            clock,
            rng,
        }
    }

    /// Handles one event to completion. Errors are logged here and returned
    /// for callers that report them; none of them leaves the shell unusable.
    ///
    /// # Errors
    ///
    /// Returns the `ShellError` describing why the event was dropped.
    pub fn handle(&mut self, event: ShellEvent) -> Result<ShellOutcome, ShellError> {
        let result = match event {
            ShellEvent::Message { origin, data } => self
                .receive_from_context(origin, &data)
                .map(|outcome| ShellOutcome::Routed { outcome }),
            ShellEvent::PopState { state } => self
                .on_pop_state(state.as_ref())
                .map(|outcome| ShellOutcome::PopState { outcome }),
            ShellEvent::NegotiationTick { portal_id, task } => Ok(ShellOutcome::Tick {
                announced: self.on_negotiation_tick(&portal_id, task),
            }),
            ShellEvent::Navigate { address } => self
                .navigate(&address)
                .map(|portal_id| ShellOutcome::Navigated { portal_id }),
        };
        if let Err(err) = &result {
            warn!(error = %err, "shell event dropped");
        }
        result
    }

    /// Creates a frame for `address` and starts negotiating its role.
    pub fn create_frame(&mut self, address: Address) -> PortalId {
        let portal_id = self.registry.create_frame(
            address,
            self.rng.as_mut(),
            self.frames.as_ref(),
            self.clock.as_ref(),
        );
        if let Some(frame) = self.registry.get_mut(&portal_id) {
            self.negotiator.start(frame, None);
        }
        portal_id
    }

    /// Shows the world at `raw`, reusing a frame already showing it, and
    /// records the transition in history.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::InvalidAddress` if `raw` cannot be resolved.
    pub fn navigate(&mut self, raw: &str) -> Result<PortalId, ShellError> {
        let address = self.navigation.location().resolve(raw)?;
        let portal_id = match self.registry.find_by_address(&address) {
            Some(frame) => frame.portal_id.clone(),
            None => self.create_frame(address),
        };
        self.enter_portal(&portal_id, true, None)?;
        Ok(portal_id)
    }

    /// Posts `message` to the frame named `portal_id`.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::UnknownTarget` if no such frame exists; nothing is
    /// sent in that case.
    pub fn send_to_portal(
        &self,
        portal_id: &PortalId,
        message: &OutboundMessage,
    ) -> Result<(), ShellError> {
        let frame = self
            .registry
            .get(portal_id)
            .ok_or_else(|| ShellError::UnknownTarget(portal_id.clone()))?;
        debug!(to = %portal_id, kind = message.kind(), "message to portal");
        self.frames.post(frame.context, message);
        Ok(())
    }

    /// Handles a negotiation tick: announces the role the frame holds now.
    pub fn on_negotiation_tick(&mut self, portal_id: &PortalId, task: TaskId) -> bool {
        let role = self.role_of(portal_id);
        match self.registry.get_mut(portal_id) {
            Some(frame) => self
                .negotiator
                .announce(frame, task, role, self.frames.as_ref()),
            None => false,
        }
    }

    /// Cancels every pending negotiation. Returns how many were cancelled.
    pub fn teardown(mut self) -> usize {
        let negotiator = &self.negotiator;
        let cancelled = self
            .registry
            .iter_mut()
            .map(|frame| negotiator.abandon(frame))
            .filter(|abandoned| *abandoned)
            .count();
        info!(cancelled, frames = self.registry.len(), "shell torn down");
        cancelled
    }

    /// Returns the current frame's id.
    #[must_use]
    pub fn current(&self) -> &PortalId {
        &self.current
    }

    /// Returns the frame registry.
    #[must_use]
    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Returns the role `portal_id` holds right now.
    #[must_use]
    pub fn role_of(&self, portal_id: &PortalId) -> WindowType {
        if *portal_id == self.current {
            WindowType::Primary
        } else {
            WindowType::Secondary
        }
    }
}
