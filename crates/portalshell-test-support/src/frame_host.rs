//! Test frame host: records every call the shell makes on its frames.

use std::collections::HashMap;
use std::sync::Mutex;

use portalshell_core::address::Address;
use portalshell_core::host::FrameHost;
use portalshell_core::ids::{ContextHandle, PortalId};
use portalshell_core::protocol::OutboundMessage;

#[derive(Debug, Default)]
struct Calls {
    created: Vec<(PortalId, Address, ContextHandle)>,
    loads: Vec<(ContextHandle, Address)>,
    posted: Vec<(ContextHandle, OutboundMessage)>,
    stack_orders: HashMap<ContextHandle, i32>,
    focused: Vec<ContextHandle>,
}

/// A frame host that hands out sequential context handles and records all
/// messages, loads, stack orders, and focus changes.
#[derive(Debug, Default)]
pub struct RecordingFrameHost {
    calls: Mutex<Calls>,
}

impl RecordingFrameHost {
    /// Creates an empty recording host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every context created so far, in creation order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created(&self) -> Vec<(PortalId, Address, ContextHandle)> {
        self.calls.lock().unwrap().created.clone()
    }

    /// Returns every retarget issued so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn loads(&self) -> Vec<(ContextHandle, Address)> {
        self.calls.lock().unwrap().loads.clone()
    }

    /// Returns the messages posted to `context`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn posted_to(&self, context: ContextHandle) -> Vec<OutboundMessage> {
        self.calls
            .lock()
            .unwrap()
            .posted
            .iter()
            .filter(|(c, _)| *c == context)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Forgets all posted messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear_posted(&self) {
        self.calls.lock().unwrap().posted.clear();
    }

    /// Returns the last stack order set for `context`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stack_order(&self, context: ContextHandle) -> Option<i32> {
        self.calls.lock().unwrap().stack_orders.get(&context).copied()
    }

    /// Returns the contexts that received focus, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn focused(&self) -> Vec<ContextHandle> {
        self.calls.lock().unwrap().focused.clone()
    }
}

impl FrameHost for RecordingFrameHost {
    fn create_context(&self, portal_id: &PortalId, address: &Address) -> ContextHandle {
        let mut calls = self.calls.lock().unwrap();
        let handle = ContextHandle(calls.created.len() as u64 + 1);
        calls
            .created
            .push((portal_id.clone(), address.clone(), handle));
        handle
    }

    fn load(&self, context: ContextHandle, address: &Address) {
        self.calls
            .lock()
            .unwrap()
            .loads
            .push((context, address.clone()));
    }

    fn post(&self, context: ContextHandle, message: &OutboundMessage) {
        self.calls
            .lock()
            .unwrap()
            .posted
            .push((context, message.clone()));
    }

    fn set_stack_order(&self, context: ContextHandle, order: i32) {
        self.calls
            .lock()
            .unwrap()
            .stack_orders
            .insert(context, order);
    }

    fn focus(&self, context: ContextHandle) {
        self.calls.lock().unwrap().focused.push(context);
    }
}
