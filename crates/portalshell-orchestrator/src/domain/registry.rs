//! The frame registry.
//!
//! Frames are keyed by portal id and never removed: background worlds stay
//! loaded so that re-entering them is instant. Stack orders are kept distinct,
//! with the current frame at `TOP_STACK_ORDER` and every other frame below it.

use std::collections::HashMap;

use portalshell_core::address::Address;
use portalshell_core::clock::Clock;
use portalshell_core::host::FrameHost;
use portalshell_core::ids::{ContextHandle, PortalId};
use portalshell_core::rng::DeterministicRng;
use tracing::{debug, info};

use super::frame::Frame;

/// Stack order of the current frame.
pub const TOP_STACK_ORDER: i32 = 0;

/// Owns every frame the shell has created.
#[derive(Debug, Default)]
pub struct FrameRegistry {
    frames: HashMap<PortalId, Frame>,
    creation_order: Vec<PortalId>,
}

impl FrameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for `address` under a fresh portal id and records it.
    ///
    /// The new frame is stacked below every existing frame; the first frame
    /// is stacked at the top. Negotiation is started by the caller.
    pub fn create_frame(
        &mut self,
        address: Address,
        rng: &mut dyn DeterministicRng,
        host: &dyn FrameHost,
        clock: &dyn Clock,
    ) -> PortalId {
        let portal_id = loop {
            let candidate = PortalId::generate(rng);
            if !self.frames.contains_key(&candidate) {
                break candidate;
            }
            debug!(portal_id = %candidate, "portal id collision, regenerating");
        };

        let stack_order = self
            .lowest_stack_order()
            .map_or(TOP_STACK_ORDER, |lowest| lowest - 1);
        let context = host.create_context(&portal_id, &address);
        host.set_stack_order(context, stack_order);

        info!(portal_id = %portal_id, %context, address = %address, "created frame");

        self.frames.insert(
            portal_id.clone(),
            Frame::new(portal_id.clone(), context, address, stack_order, clock.now()),
        );
        self.creation_order.push(portal_id.clone());
        portal_id
    }

    /// Looks up a frame by portal id.
    #[must_use]
    pub fn get(&self, portal_id: &PortalId) -> Option<&Frame> {
        self.frames.get(portal_id)
    }

    /// Looks up a frame by portal id for mutation.
    pub fn get_mut(&mut self, portal_id: &PortalId) -> Option<&mut Frame> {
        self.frames.get_mut(portal_id)
    }

    /// Returns `true` if `portal_id` names a frame.
    #[must_use]
    pub fn contains(&self, portal_id: &PortalId) -> bool {
        self.frames.contains_key(portal_id)
    }

    /// Returns the first frame, in creation order, showing `address`.
    #[must_use]
    pub fn find_by_address(&self, address: &Address) -> Option<&Frame> {
        self.iter().find(|frame| frame.address == *address)
    }

    /// Returns the frame whose context posted a message.
    #[must_use]
    pub fn find_by_context(&self, context: ContextHandle) -> Option<&Frame> {
        self.frames.values().find(|frame| frame.context == context)
    }

    /// Iterates frames in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.creation_order
            .iter()
            .filter_map(|portal_id| self.frames.get(portal_id))
    }

    /// Iterates frames for mutation, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
        self.frames.values_mut()
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frame was created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Moves `target` to the top and `outgoing` below every other frame, and
    /// pushes the new orders to the host. Both ids must be registered.
    pub fn promote(&mut self, target: &PortalId, outgoing: &PortalId, host: &dyn FrameHost) {
        if target != outgoing {
            let floor = self
                .frames
                .values()
                .filter(|frame| frame.portal_id != *outgoing)
                .map(|frame| frame.stack_order)
                .min()
                .unwrap_or(TOP_STACK_ORDER);
            if let Some(frame) = self.frames.get_mut(outgoing) {
                frame.stack_order = floor.min(TOP_STACK_ORDER) - 1;
                host.set_stack_order(frame.context, frame.stack_order);
            }
        }
        if let Some(frame) = self.frames.get_mut(target) {
            frame.stack_order = TOP_STACK_ORDER;
            host.set_stack_order(frame.context, frame.stack_order);
        }
    }

    fn lowest_stack_order(&self) -> Option<i32> {
        self.frames.values().map(|frame| frame.stack_order).min()
    }
}
