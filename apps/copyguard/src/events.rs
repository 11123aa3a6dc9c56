//! Tree events and the subscription lifecycle.
//!
//! Hosts publish `TreeEvent`s on an `EventHub`; a `Lifecycle` holds the
//! subscriptions that route them to an `Orchestrator` and drops them on
//! shutdown.

use crate::models::ProjectRef;
use crate::orchestrator::Orchestrator;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The whole tree was opened; re-check everything.
    TreeOpened,
    /// One project finished loading.
    ProjectLoaded(ProjectRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&TreeEvent) + Send + Sync>;

#[derive(Default)]
/// Ordered list of event subscribers.
pub struct EventHub {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        handler: impl Fn(&TreeEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    /// Deliver `event` to every current subscriber in subscription order.
    ///
    /// Handlers run outside the subscriber lock, so a handler may itself
    /// subscribe or unsubscribe.
    pub fn publish(&self, event: &TreeEvent) {
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Subscriptions held for the lifetime of the host process.
pub struct Lifecycle {
    hub: Arc<EventHub>,
    subscriptions: Vec<SubscriptionId>,
}

impl Lifecycle {
    /// Route every event on `hub` to `orchestrator`.
    pub fn attach(hub: Arc<EventHub>, orchestrator: Arc<Orchestrator>) -> Self {
        let id = hub.subscribe(move |event| {
            tracing::debug!(?event, "tree event");
            orchestrator.dispatch(event);
        });
        Self {
            hub,
            subscriptions: vec![id],
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn shutdown(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.hub.unsubscribe(id);
        }
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
