//! In-process event bus with synchronous handler invocation.
//!
//! `publish` calls every handler registered for the event's kind, in
//! registration order, on the caller's stack. A handler may hand back
//! pending work; the bus spawns it on the tokio runtime and returns without
//! awaiting it. Publishing from inside a handler, or from pending work, is
//! dispatched depth-first in the same way.
//!
//! A handler that panics is logged and skipped; the remaining handlers for
//! the same event still run and the publisher never observes the failure.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use parking_lot::RwLock;
use tokio::sync::Notify;

use myhouse_domain::event::StateChange;
use myhouse_domain::id::{ObserverId, SubscriptionId};

/// Discriminant used to register interest in one family of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StateChange,
    NewConnection,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StateChange => "STATE_CHANGE",
            Self::NewConnection => "NEW_CONNECTION",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A field of the home state was written.
    StateChange(StateChange),
    /// A real-time observer attached.
    NewConnection(ObserverId),
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StateChange(_) => EventKind::StateChange,
            Self::NewConnection(_) => EventKind::NewConnection,
        }
    }
}

/// What a handler hands back to the bus.
pub enum Reaction {
    /// All work happened during the call.
    Done,
    /// Work that continues after the call returns. Spawned, never awaited by
    /// `publish`.
    Pending(BoxFuture<'static, ()>),
}

type Handler = Arc<dyn Fn(&Event) -> Reaction + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

/// Decrements the in-flight counter when the spawned work ends, including by
/// panic or runtime shutdown.
struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn new(in_flight: Arc<InFlight>) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Process-wide publish/subscribe register.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
    in_flight: Arc<InFlight>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future event of `kind`.
    ///
    /// Handlers of the same kind are invoked in registration order.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Reaction + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscriptions.write().push(Subscription {
            id,
            kind,
            handler: Arc::new(handler),
        });
        tracing::debug!(subscription = %id, %kind, "handler subscribed");
        id
    }

    /// Remove a handler. Returns `false` when it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|sub| sub.id != id);
        before != subscriptions.len()
    }

    /// Invoke every handler currently registered for the event's kind.
    ///
    /// Returns once each handler has been called, not once their pending work
    /// has completed. The handler list is snapshotted first, so handlers may
    /// publish or (un)subscribe re-entrantly.
    pub fn publish(&self, event: &Event) {
        let kind = event.kind();
        let handlers: Vec<(SubscriptionId, Handler)> = self
            .subscriptions
            .read()
            .iter()
            .filter(|sub| sub.kind == kind)
            .map(|sub| (sub.id, Arc::clone(&sub.handler)))
            .collect();

        for (id, handler) in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Reaction::Done) => {}
                Ok(Reaction::Pending(work)) => self.spawn(id, work),
                Err(_) => {
                    tracing::error!(subscription = %id, %kind, "event handler panicked");
                }
            }
        }
    }

    fn spawn(&self, id: SubscriptionId, work: BoxFuture<'static, ()>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(subscription = %id, "no async runtime, pending handler work dropped");
            return;
        };
        let guard = InFlightGuard::new(Arc::clone(&self.in_flight));
        runtime.spawn(async move {
            let _guard = guard;
            work.await;
        });
    }

    /// Number of spawned handler futures that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Wait until no spawned handler work is left, including work spawned by
    /// other pending work (rule cascades).
    pub async fn wait_idle(&self) {
        loop {
            let mut notified = std::pin::pin!(self.in_flight.idle.notified());
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}
