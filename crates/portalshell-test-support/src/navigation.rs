//! Test navigation host: an in-memory history that records pushes,
//! replaces, and reloads.

use std::sync::Mutex;

use portalshell_core::address::Address;
use portalshell_core::host::NavigationHost;
use portalshell_core::protocol::HistoryEntry;

#[derive(Debug)]
struct State {
    location: Address,
    pushed: Vec<HistoryEntry>,
    replaced: Vec<HistoryEntry>,
    reloads: usize,
}

/// A navigation host whose location tests can move directly, mimicking the
/// browser updating the location bar before firing a back/forward event.
#[derive(Debug)]
pub struct RecordingNavigation {
    state: Mutex<State>,
}

impl RecordingNavigation {
    /// Creates a host displaying `location`.
    ///
    /// # Panics
    ///
    /// Panics if `location` is not an absolute address.
    #[must_use]
    pub fn at(location: &str) -> Self {
        Self {
            state: Mutex::new(State {
                location: Address::parse(location).expect("test location must be absolute"),
                pushed: Vec::new(),
                replaced: Vec::new(),
                reloads: 0,
            }),
        }
    }

    /// Moves the displayed location without touching the history.
    ///
    /// # Panics
    ///
    /// Panics if `location` is not absolute or the mutex is poisoned.
    pub fn set_location(&self, location: &str) {
        self.state.lock().unwrap().location =
            Address::parse(location).expect("test location must be absolute");
    }

    /// Returns all pushed entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pushed(&self) -> Vec<HistoryEntry> {
        self.state.lock().unwrap().pushed.clone()
    }

    /// Returns all replaced entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn replaced(&self) -> Vec<HistoryEntry> {
        self.state.lock().unwrap().replaced.clone()
    }

    /// Returns how many reloads were requested.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn reloads(&self) -> usize {
        self.state.lock().unwrap().reloads
    }
}

impl NavigationHost for RecordingNavigation {
    fn location(&self) -> Address {
        self.state.lock().unwrap().location.clone()
    }

    fn push_entry(&self, entry: &HistoryEntry) {
        let mut state = self.state.lock().unwrap();
        state.location = entry.address.clone();
        state.pushed.push(entry.clone());
    }

    fn replace_entry(&self, entry: &HistoryEntry) {
        let mut state = self.state.lock().unwrap();
        state.location = entry.address.clone();
        state.replaced.push(entry.clone());
    }

    fn reload(&self) {
        self.state.lock().unwrap().reloads += 1;
    }
}
