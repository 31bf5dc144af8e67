//! Test scheduler: tracks repeating tasks without running them. Tests drive
//! ticks by hand through `Shell::handle`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use portalshell_core::ids::{PortalId, TaskId};
use portalshell_core::scheduler::Scheduler;

#[derive(Debug, Default)]
struct Tasks {
    next_id: u64,
    active: HashMap<TaskId, (PortalId, Duration)>,
    started: Vec<(PortalId, TaskId)>,
    cancelled: Vec<TaskId>,
}

/// A scheduler that only records which tasks are started and cancelled.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    tasks: Mutex<Tasks>,
}

impl ManualScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active tasks for `portal_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn active_for(&self, portal_id: &PortalId) -> Vec<TaskId> {
        self.tasks
            .lock()
            .unwrap()
            .active
            .iter()
            .filter(|(_, (p, _))| p == portal_id)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns the number of tasks ever started for `portal_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn start_count(&self, portal_id: &PortalId) -> usize {
        self.tasks
            .lock()
            .unwrap()
            .started
            .iter()
            .filter(|(p, _)| p == portal_id)
            .count()
    }

    /// Returns every cancel call, including repeated ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn cancelled(&self) -> Vec<TaskId> {
        self.tasks.lock().unwrap().cancelled.clone()
    }

    /// Returns the number of active tasks across all portals.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn active_count(&self) -> usize {
        self.tasks.lock().unwrap().active.len()
    }

    /// Returns the interval an active task was started with.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn interval_of(&self, task: TaskId) -> Option<Duration> {
        self.tasks
            .lock()
            .unwrap()
            .active
            .get(&task)
            .map(|(_, interval)| *interval)
    }
}

impl Scheduler for ManualScheduler {
    fn start_repeating(&self, portal_id: &PortalId, interval: Duration) -> TaskId {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.next_id += 1;
        let id = TaskId(tasks.next_id);
        tasks.active.insert(id, (portal_id.clone(), interval));
        tasks.started.push((portal_id.clone(), id));
        id
    }

    fn cancel(&self, task: TaskId) {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.active.remove(&task);
        tasks.cancelled.push(task);
    }
}
