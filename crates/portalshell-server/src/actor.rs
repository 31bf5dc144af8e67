//! Shell actor.
//!
//! The `Shell` is `&mut`-owned by one tokio task. HTTP handlers talk to it
//! through a cloneable [`ShellHandle`]; negotiation ticks arrive on a second
//! channel from the scheduler. Both are drained by the same loop, so no two
//! events are ever handled at once.
//!
//! ```text
//!   ShellHandle (Clone)   mpsc     shell task              mpsc    TokioScheduler
//!   ┌────────────────┐  ──────▶  ┌───────────────────┐  ◀──────  ┌──────────────┐
//!   │ .handle()      │           │ Shell::handle     │   ticks   │ interval     │
//!   │ .snapshot()    │  ◀──────  │ one event at a    │           │ tasks        │
//!   │ .shutdown()    │  oneshot  │ time              │           └──────────────┘
//!   └────────────────┘           └───────────────────┘
//! ```

use portalshell_core::error::ShellError;
use portalshell_orchestrator::application::views::ShellSnapshot;
use portalshell_orchestrator::{Shell, ShellEvent, ShellOutcome};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::headless::Tick;

// ============================================================================
// Error Type
// ============================================================================

/// Errors from talking to the shell actor.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// The shell rejected the event.
    #[error(transparent)]
    Shell(#[from] ShellError),
    /// The shell task is gone.
    #[error("shell actor shut down")]
    Shutdown,
}

// ============================================================================
// Commands (internal)
// ============================================================================

#[derive(Debug)]
enum ShellCommand {
    Handle {
        event: ShellEvent,
        reply: oneshot::Sender<Result<ShellOutcome, ShellError>>,
    },
    Snapshot {
        reply: oneshot::Sender<ShellSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<usize>,
    },
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable, `Send + Sync` access to the running shell.
#[derive(Debug, Clone)]
pub struct ShellHandle {
    tx: mpsc::UnboundedSender<ShellCommand>,
}

impl ShellHandle {
    /// Runs `event` through the shell and returns what it did.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Shell` if the shell rejected the event and
    /// `ActorError::Shutdown` if the shell task has stopped.
    pub async fn handle(&self, event: ShellEvent) -> Result<ShellOutcome, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.send(ShellCommand::Handle { event, reply })?;
        let result = rx.await.map_err(|_| ActorError::Shutdown)?;
        Ok(result?)
    }

    /// Returns a snapshot of every frame.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Shutdown` if the shell task has stopped.
    pub async fn snapshot(&self) -> Result<ShellSnapshot, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.send(ShellCommand::Snapshot { reply })?;
        rx.await.map_err(|_| ActorError::Shutdown)
    }

    /// Tears the shell down and stops its task. Returns how many pending
    /// negotiations were cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Shutdown` if the shell task had already stopped.
    pub async fn shutdown(&self) -> Result<usize, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.send(ShellCommand::Shutdown { reply })?;
        rx.await.map_err(|_| ActorError::Shutdown)
    }

    fn send(&self, command: ShellCommand) -> Result<(), ActorError> {
        self.tx.send(command).map_err(|_| ActorError::Shutdown)
    }
}

// ============================================================================
// Actor loop
// ============================================================================

/// Spawns the task that owns `shell`. Ticks from the scheduler arrive on
/// `ticks`. When every handle is dropped the shell is torn down.
#[must_use]
pub fn spawn_shell(
    shell: Shell,
    ticks: mpsc::UnboundedReceiver<Tick>,
) -> (ShellHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(shell, rx, ticks));
    (ShellHandle { tx }, task)
}

async fn run(
    mut shell: Shell,
    mut commands: mpsc::UnboundedReceiver<ShellCommand>,
    mut ticks: mpsc::UnboundedReceiver<Tick>,
) {
    info!(portal_id = %shell.current(), "shell actor running");
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ShellCommand::Handle { event, reply }) => {
                    let _ = reply.send(shell.handle(event));
                }
                Some(ShellCommand::Snapshot { reply }) => {
                    let _ = reply.send(shell.snapshot());
                }
                Some(ShellCommand::Shutdown { reply }) => {
                    let cancelled = shell.teardown();
                    let _ = reply.send(cancelled);
                    break;
                }
                None => {
                    debug!("all shell handles dropped");
                    shell.teardown();
                    break;
                }
            },
            Some(Tick { portal_id, task }) = ticks.recv() => {
                let _ = shell.handle(ShellEvent::NegotiationTick { portal_id, task });
            }
        }
    }
    info!("shell actor stopped");
}
