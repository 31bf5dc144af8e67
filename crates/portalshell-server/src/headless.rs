//! In-memory host ports for running the shell without a window.
//!
//! Frames are mailboxes that HTTP clients drain. History is a plain stack
//! with a cursor. Negotiation loops are tokio tasks that feed ticks back into
//! the shell actor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use portalshell_core::address::Address;
use portalshell_core::host::{FrameHost, NavigationHost};
use portalshell_core::ids::{ContextHandle, PortalId, TaskId};
use portalshell_core::protocol::{HistoryEntry, OutboundMessage};
use portalshell_core::scheduler::Scheduler;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Frames
// ============================================================================

#[derive(Debug)]
struct HeadlessContext {
    portal_id: PortalId,
    address: Address,
    stack_order: i32,
    mailbox: Vec<OutboundMessage>,
}

#[derive(Debug, Default)]
struct Contexts {
    next: u64,
    by_handle: HashMap<ContextHandle, HeadlessContext>,
    focused: Option<ContextHandle>,
}

/// A frame host whose contexts are outbound mailboxes.
#[derive(Debug, Default)]
pub struct HeadlessFrameHost {
    contexts: Mutex<Contexts>,
}

impl HeadlessFrameHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every message queued for `context`, oldest first. Returns `None`
    /// if no such context exists.
    pub fn drain_mailbox(&self, context: ContextHandle) -> Option<Vec<OutboundMessage>> {
        lock(&self.contexts)
            .by_handle
            .get_mut(&context)
            .map(|ctx| std::mem::take(&mut ctx.mailbox))
    }

    /// Returns the context that has focus.
    pub fn focused(&self) -> Option<ContextHandle> {
        lock(&self.contexts).focused
    }

    /// Returns the address and stack order the host last applied to
    /// `context`.
    pub fn describe(&self, context: ContextHandle) -> Option<(PortalId, Address, i32)> {
        lock(&self.contexts)
            .by_handle
            .get(&context)
            .map(|ctx| (ctx.portal_id.clone(), ctx.address.clone(), ctx.stack_order))
    }
}

impl FrameHost for HeadlessFrameHost {
    fn create_context(&self, portal_id: &PortalId, address: &Address) -> ContextHandle {
        let mut contexts = lock(&self.contexts);
        contexts.next += 1;
        let handle = ContextHandle(contexts.next);
        contexts.by_handle.insert(
            handle,
            HeadlessContext {
                portal_id: portal_id.clone(),
                address: address.clone(),
                stack_order: 0,
                mailbox: Vec::new(),
            },
        );
        debug!(%handle, %portal_id, "headless context created");
        handle
    }

    fn load(&self, context: ContextHandle, address: &Address) {
        if let Some(ctx) = lock(&self.contexts).by_handle.get_mut(&context) {
            ctx.address = address.clone();
            ctx.mailbox.clear();
        }
    }

    fn post(&self, context: ContextHandle, message: &OutboundMessage) {
        if let Some(ctx) = lock(&self.contexts).by_handle.get_mut(&context) {
            ctx.mailbox.push(message.clone());
        }
    }

    fn set_stack_order(&self, context: ContextHandle, order: i32) {
        if let Some(ctx) = lock(&self.contexts).by_handle.get_mut(&context) {
            ctx.stack_order = order;
        }
    }

    fn focus(&self, context: ContextHandle) {
        lock(&self.contexts).focused = Some(context);
    }
}

// ============================================================================
// History
// ============================================================================

/// Serializable view of the headless history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    /// Every entry, oldest first.
    pub entries: Vec<HistoryEntry>,
    /// Index of the active entry.
    pub cursor: usize,
    /// Location being displayed.
    pub location: Address,
    /// Number of reloads requested so far.
    pub reloads: usize,
}

#[derive(Debug)]
struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    location: Address,
    reloads: usize,
}

/// A history stack with a cursor, like a browser tab's session history.
#[derive(Debug)]
pub struct HeadlessNavigation {
    history: Mutex<History>,
}

impl HeadlessNavigation {
    /// Creates an empty history displaying `location`.
    #[must_use]
    pub fn new(location: Address) -> Self {
        Self {
            history: Mutex::new(History {
                entries: Vec::new(),
                cursor: 0,
                location,
                reloads: 0,
            }),
        }
    }

    /// Moves the cursor one entry back and displays it. Returns the state
    /// stored with the entry, or `None` at the start of history.
    pub fn back(&self) -> Option<Value> {
        let mut history = lock(&self.history);
        if history.cursor == 0 || history.entries.is_empty() {
            return None;
        }
        history.cursor -= 1;
        Some(Self::show_cursor(&mut history))
    }

    /// Moves the cursor one entry forward and displays it. Returns the state
    /// stored with the entry, or `None` at the end of history.
    pub fn forward(&self) -> Option<Value> {
        let mut history = lock(&self.history);
        if history.cursor + 1 >= history.entries.len() {
            return None;
        }
        history.cursor += 1;
        Some(Self::show_cursor(&mut history))
    }

    fn show_cursor(history: &mut History) -> Value {
        let entry = history.entries[history.cursor].clone();
        history.location = entry.address.clone();
        serde_json::to_value(entry).unwrap_or(Value::Null)
    }

    /// Returns the current history, cursor, and location.
    pub fn view(&self) -> HistoryView {
        let history = lock(&self.history);
        HistoryView {
            entries: history.entries.clone(),
            cursor: history.cursor,
            location: history.location.clone(),
            reloads: history.reloads,
        }
    }
}

impl NavigationHost for HeadlessNavigation {
    fn location(&self) -> Address {
        lock(&self.history).location.clone()
    }

    fn push_entry(&self, entry: &HistoryEntry) {
        let mut history = lock(&self.history);
        if !history.entries.is_empty() {
            let keep = history.cursor + 1;
            history.entries.truncate(keep);
        }
        history.entries.push(entry.clone());
        history.cursor = history.entries.len() - 1;
        history.location = entry.address.clone();
    }

    fn replace_entry(&self, entry: &HistoryEntry) {
        let mut history = lock(&self.history);
        if history.entries.is_empty() {
            history.entries.push(entry.clone());
        } else {
            let cursor = history.cursor;
            history.entries[cursor] = entry.clone();
        }
        history.location = entry.address.clone();
    }

    /// Records the request without touching the shell. There is no page to
    /// reload headlessly, so the shell keeps its frames and current frame;
    /// clients see the request through [`HistoryView::reloads`].
    fn reload(&self) {
        let mut history = lock(&self.history);
        history.reloads += 1;
        info!(location = %history.location, "reload requested");
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// A negotiation tick produced by [`TokioScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// Frame whose loop fired.
    pub portal_id: PortalId,
    /// Loop that fired, so stale ticks can be told apart.
    pub task: TaskId,
}

/// Runs each repeating task as a tokio task that sends [`Tick`]s.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    ticks: mpsc::UnboundedSender<Tick>,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<TaskId, JoinHandle<()>>>,
}

impl TokioScheduler {
    /// Creates a scheduler delivering ticks on `ticks`.
    #[must_use]
    pub fn new(ticks: mpsc::UnboundedSender<Tick>) -> Self {
        Self {
            ticks,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns how many tasks are still scheduled.
    pub fn active_count(&self) -> usize {
        lock(&self.tasks).len()
    }
}

impl Scheduler for TokioScheduler {
    fn start_repeating(&self, portal_id: &PortalId, interval: Duration) -> TaskId {
        let task = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let ticks = self.ticks.clone();
        let portal_id = portal_id.clone();
        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + interval, interval);
            loop {
                timer.tick().await;
                let tick = Tick {
                    portal_id: portal_id.clone(),
                    task,
                };
                if ticks.send(tick).is_err() {
                    break;
                }
            }
        });
        lock(&self.tasks).insert(task, handle);
        task
    }

    fn cancel(&self, task: TaskId) {
        if let Some(handle) = lock(&self.tasks).remove(&task) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in lock(&self.tasks).drain() {
            handle.abort();
        }
    }
}
