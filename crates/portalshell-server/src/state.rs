//! Shared application state.

use std::sync::Arc;

use portalshell_core::address::Address;
use portalshell_core::clock::{Clock, SystemClock};
use portalshell_core::rng::{DeterministicRng, SystemRng};
use portalshell_orchestrator::{Shell, ShellConfig, ShellPorts};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::{ShellHandle, spawn_shell};
use crate::headless::{HeadlessFrameHost, HeadlessNavigation, TokioScheduler};

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The running shell.
    pub shell: ShellHandle,
    /// Frame mailboxes, read directly by the mailbox route.
    pub frames: Arc<HeadlessFrameHost>,
    /// Headless history, moved directly by back/forward routes.
    pub navigation: Arc<HeadlessNavigation>,
}

impl AppState {
    /// Starts a headless shell at `start_address` with the system clock and
    /// entropy-seeded portal ids. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(config: ShellConfig, start_address: Address) -> (Self, JoinHandle<()>) {
        Self::start_with(
            config,
            start_address,
            Arc::new(SystemClock),
            Box::new(SystemRng::from_entropy()),
        )
    }

    /// Starts a headless shell with an injected clock and RNG.
    #[must_use]
    pub fn start_with(
        config: ShellConfig,
        start_address: Address,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> (Self, JoinHandle<()>) {
        let frames = Arc::new(HeadlessFrameHost::new());
        let navigation = Arc::new(HeadlessNavigation::new(start_address));
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let shell = Shell::start(
            config,
            ShellPorts {
                frames: frames.clone(),
                navigation: navigation.clone(),
                scheduler: Arc::new(TokioScheduler::new(tick_tx)),
                clock,
                rng,
            },
        );
        let (shell, task) = spawn_shell(shell, tick_rx);
        (
            Self {
                shell,
                frames,
                navigation,
            },
            task,
        )
    }
}
