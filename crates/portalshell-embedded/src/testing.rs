//! Recording `ParentLink` for unit tests.

use std::sync::Mutex;

use portalshell_core::protocol::InboundMessage;

use crate::link::ParentLink;

#[derive(Debug, Default)]
struct Calls {
    posted: Vec<InboundMessage>,
    overlay: Vec<bool>,
    focus: usize,
}

/// Records everything sent to the parent.
#[derive(Debug, Default)]
pub(crate) struct RecordingParentLink {
    embedded: bool,
    calls: Mutex<Calls>,
}

impl RecordingParentLink {
    pub(crate) fn embedded() -> Self {
        Self {
            embedded: true,
            ..Self::default()
        }
    }

    pub(crate) fn top_level() -> Self {
        Self::default()
    }

    pub(crate) fn posted(&self) -> Vec<InboundMessage> {
        self.calls.lock().unwrap().posted.clone()
    }

    pub(crate) fn overlay(&self) -> Vec<bool> {
        self.calls.lock().unwrap().overlay.clone()
    }

    pub(crate) fn focus_count(&self) -> usize {
        self.calls.lock().unwrap().focus
    }
}

impl ParentLink for RecordingParentLink {
    fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn post_to_parent(&self, message: &InboundMessage) {
        self.calls.lock().unwrap().posted.push(message.clone());
    }

    fn set_overlay_current(&self, current: bool) {
        self.calls.lock().unwrap().overlay.push(current);
    }

    fn focus(&self) {
        self.calls.lock().unwrap().focus += 1;
    }
}
