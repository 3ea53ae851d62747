//! Event channel abstraction.
//!
//! `SyncChannel` sits between the session and the transport. It builds
//! outgoing frames, remembers which acknowledgement belongs to which request,
//! and keeps the subscriber registry for incoming events.
//!
//! Handlers (`H`) and acknowledgement continuations (`K`) are plain values.
//! [`SyncChannel::dispatch`] hands the matching handlers back in registration
//! order and [`SyncChannel::resolve_ack`] hands back the stored continuation,
//! so the owner runs them with full access to its own state.
//!
//! # Invariants
//!
//! - Subscription ids and request ids only grow; neither is reused.
//! - Nothing is queued while disconnected. A failed send is final.
//! - A continuation leaves the table exactly once: resolved or discarded.

use std::collections::HashMap;

use kingside_proto::{EventName, Frame};
use serde::Serialize;

use crate::error::ChannelError;

/// Handle returned by [`SyncChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
struct Subscription<H> {
    id: SubscriptionId,
    name: EventName,
    handler: H,
}

/// Named-event channel with acknowledgement tracking.
#[derive(Debug, Clone)]
pub struct SyncChannel<H, K> {
    connected: bool,
    subscriptions: Vec<Subscription<H>>,
    pending_acks: HashMap<u64, K>,
    next_subscription: u64,
    next_request: u64,
}

impl<H: Clone, K> SyncChannel<H, K> {
    /// A channel that has not connected yet.
    pub fn new() -> Self {
        Self {
            connected: false,
            subscriptions: Vec::new(),
            pending_acks: HashMap::new(),
            next_subscription: 0,
            next_request: 0,
        }
    }

    /// Transport is up.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Mark the transport up and return the `connect` subscribers.
    pub fn connect(&mut self) -> Vec<H> {
        self.connected = true;
        self.dispatch(EventName::Connect)
    }

    /// Mark the transport down and return the `disconnect` subscribers.
    ///
    /// Outstanding acknowledgements are kept; a late reply still resolves.
    pub fn disconnect(&mut self) -> Vec<H> {
        self.connected = false;
        self.dispatch(EventName::Disconnect)
    }

    /// Register `handler` for `name`.
    pub fn subscribe(&mut self, name: EventName, handler: H) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription { id, name, handler });
        id
    }

    /// Remove one registration. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of handlers registered for `name`.
    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.subscriptions.iter().filter(|s| s.name == name).count()
    }

    /// Handlers for `name`, in registration order.
    pub fn dispatch(&self, name: EventName) -> Vec<H> {
        self.subscriptions.iter().filter(|s| s.name == name).map(|s| s.handler.clone()).collect()
    }

    /// Build a fire-and-forget frame.
    pub fn send<T: Serialize>(&self, name: EventName, payload: &T) -> Result<Frame, ChannelError> {
        if !self.connected {
            return Err(ChannelError::Disconnected { name });
        }
        Ok(Frame::event(name, payload)?)
    }

    /// Build a request frame and park `continuation` until its reply.
    pub fn send_with_ack<T: Serialize>(
        &mut self,
        name: EventName,
        payload: &T,
        continuation: K,
    ) -> Result<Frame, ChannelError> {
        if !self.connected {
            return Err(ChannelError::Disconnected { name });
        }
        let request_id = self.next_request;
        let frame = Frame::request(name, request_id, payload)?;

        self.next_request += 1;
        self.pending_acks.insert(request_id, continuation);
        Ok(frame)
    }

    /// Take the continuation waiting for `request_id`.
    pub fn resolve_ack(&mut self, request_id: u64) -> Option<K> {
        let continuation = self.pending_acks.remove(&request_id);
        if continuation.is_none() {
            tracing::warn!(request_id, "acknowledgement for unknown request ignored");
        }
        continuation
    }

    /// Forget continuations matching `stale`. Returns how many were dropped.
    ///
    /// A reply that arrives later for a dropped request is treated like any
    /// other unknown acknowledgement.
    pub fn discard_acks(&mut self, mut stale: impl FnMut(&K) -> bool) -> usize {
        let before = self.pending_acks.len();
        self.pending_acks.retain(|_, continuation| !stale(continuation));
        before - self.pending_acks.len()
    }

    /// Requests still waiting for a reply.
    pub fn pending_acks(&self) -> usize {
        self.pending_acks.len()
    }
}

impl<H: Clone, K> Default for SyncChannel<H, K> {
    fn default() -> Self {
        Self::new()
    }
}
