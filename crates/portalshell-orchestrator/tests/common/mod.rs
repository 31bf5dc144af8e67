//! Shared helpers for shell scenario tests.
#![allow(dead_code)]

use std::sync::Arc;

use portalshell_core::address::Address;
use portalshell_core::ids::{ContextHandle, PortalId};
use portalshell_core::rng::DeterministicRng;
use portalshell_orchestrator::{Shell, ShellConfig, ShellEvent, ShellOutcome, ShellPorts};
use portalshell_test_support::{
    FixedClock, ManualScheduler, MockRng, RecordingFrameHost, RecordingNavigation,
};
use serde_json::{Value, json};

/// Location the shell starts at in every scenario.
pub const START: &str = "https://worlds.example/lobby";

/// A started shell wired to recording test doubles.
pub struct Harness {
    pub shell: Shell,
    pub host: Arc<RecordingFrameHost>,
    pub navigation: Arc<RecordingNavigation>,
    pub scheduler: Arc<ManualScheduler>,
}

impl Harness {
    /// Starts a shell at `START` drawing ids from a stepping RNG.
    pub fn start() -> Self {
        Self::start_with_rng(Box::new(MockRng::default()))
    }

    /// Starts a shell at `START` drawing ids from `rng`.
    pub fn start_with_rng(rng: Box<dyn DeterministicRng>) -> Self {
        let host = Arc::new(RecordingFrameHost::new());
        let navigation = Arc::new(RecordingNavigation::at(START));
        let scheduler = Arc::new(ManualScheduler::new());
        let shell = Shell::start(
            ShellConfig::default(),
            ShellPorts {
                frames: host.clone(),
                navigation: navigation.clone(),
                scheduler: scheduler.clone(),
                clock: Arc::new(FixedClock::at_test_epoch()),
                rng,
            },
        );
        Self {
            shell,
            host,
            navigation,
            scheduler,
        }
    }

    /// Creates a frame for an absolute `address`.
    pub fn open(&mut self, address: &str) -> PortalId {
        self.shell.create_frame(Address::parse(address).unwrap())
    }

    /// Returns the context handle of `portal_id`.
    pub fn context_of(&self, portal_id: &PortalId) -> ContextHandle {
        self.shell.registry().get(portal_id).unwrap().context
    }

    /// Delivers `data` as if posted by the context of `from`.
    pub fn post_from(
        &mut self,
        from: &PortalId,
        data: Value,
    ) -> Result<ShellOutcome, portalshell_core::error::ShellError> {
        let origin = self.context_of(from);
        self.shell.handle(ShellEvent::Message { origin, data })
    }

    /// Fires every active negotiation loop once, then answers `started` from
    /// each frame that received an announcement.
    pub fn settle_all(&mut self) {
        let pending: Vec<_> = self
            .shell
            .registry()
            .iter()
            .filter(|f| f.is_negotiating())
            .map(|f| f.portal_id.clone())
            .collect();
        for portal_id in pending {
            for task in self.scheduler.active_for(&portal_id) {
                self.shell
                    .handle(ShellEvent::NegotiationTick {
                        portal_id: portal_id.clone(),
                        task,
                    })
                    .unwrap();
            }
            self.post_from(&portal_id, json!({ "kind": "started" }))
                .unwrap();
        }
    }

    /// Asserts exactly one frame is current and it paints above all others.
    pub fn assert_single_current_on_top(&self) {
        let snapshot = self.shell.snapshot();
        let current: Vec<_> = snapshot.frames.iter().filter(|f| f.current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].portal_id, snapshot.current);
        let top = current[0].stack_order;
        assert!(
            snapshot
                .frames
                .iter()
                .filter(|f| !f.current)
                .all(|f| f.stack_order < top)
        );
    }
}
