//! Broadcast hub: keeps real-time observers in sync with the state store.
//!
//! An observer is an unbounded channel owned by a transport. On attach the
//! hub publishes `NEW_CONNECTION`; its handler reads the state and sends the
//! observer an `INIT` snapshot. Every `STATE_CHANGE` is forwarded as an
//! `UPDATE` to each attached observer, during the publish call, so the
//! order observers see is the order the store published in.
//!
//! Updates published between attach and `INIT` are held for that observer
//! and sent right after it. An observer whose channel is closed is logged
//! and dropped without affecting the others.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use myhouse_domain::event::StateChange;
use myhouse_domain::id::{ObserverId, SubscriptionId};
use myhouse_domain::message::ObserverMessage;

use crate::event_bus::{Event, EventKind, Reaction};
use crate::ports::StateRepository;
use crate::state_store::StateStore;

/// A push to one observer failed. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
#[error("observer {observer_id} is no longer receiving")]
pub struct BroadcastDeliveryError {
    pub observer_id: ObserverId,
}

struct Observer {
    tx: UnboundedSender<ObserverMessage>,
    initialised: bool,
    backlog: Vec<StateChange>,
}

pub struct BroadcastHub<R> {
    store: Arc<StateStore<R>>,
    observers: Mutex<HashMap<ObserverId, Observer>>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl<R> BroadcastHub<R>
where
    R: StateRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<StateStore<R>>) -> Self {
        Self {
            store,
            observers: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe the hub to `STATE_CHANGE` and `NEW_CONNECTION`.
    #[must_use]
    pub fn start(self) -> Arc<Self> {
        let hub = Arc::new(self);
        let bus = hub.store.bus();

        let weak: Weak<Self> = Arc::downgrade(&hub);
        let on_change = bus.subscribe(EventKind::StateChange, move |event| {
            if let (Event::StateChange(change), Some(hub)) = (event, weak.upgrade()) {
                hub.forward(change);
            }
            Reaction::Done
        });

        let weak: Weak<Self> = Arc::downgrade(&hub);
        let on_connect = bus.subscribe(EventKind::NewConnection, move |event| {
            let (Event::NewConnection(observer_id), Some(hub)) = (event, weak.upgrade()) else {
                return Reaction::Done;
            };
            let observer_id = *observer_id;
            Reaction::Pending(Box::pin(async move { hub.send_init(observer_id).await }))
        });

        hub.subscriptions.lock().extend([on_change, on_connect]);
        hub
    }

    /// Register an observer and announce it on the bus.
    pub fn attach(&self, tx: UnboundedSender<ObserverMessage>) -> ObserverId {
        let observer_id = ObserverId::new();
        self.observers.lock().insert(
            observer_id,
            Observer {
                tx,
                initialised: false,
                backlog: Vec::new(),
            },
        );
        tracing::info!(%observer_id, "observer attached");
        self.store
            .bus()
            .publish(&Event::NewConnection(observer_id));
        observer_id
    }

    /// Forget an observer. Returns `false` if it was not attached.
    pub fn detach(&self, observer_id: ObserverId) -> bool {
        let removed = self.observers.lock().remove(&observer_id).is_some();
        if removed {
            tracing::info!(%observer_id, "observer detached");
        }
        removed
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Remove the hub's handlers from the bus. Attached observers are dropped,
    /// which closes their channels.
    pub fn stop(&self) {
        let bus = self.store.bus();
        for id in self.subscriptions.lock().drain(..) {
            bus.unsubscribe(id);
        }
        self.observers.lock().clear();
    }

    fn forward(&self, change: &StateChange) {
        let mut observers = self.observers.lock();
        let mut closed = Vec::new();
        for (observer_id, observer) in observers.iter_mut() {
            if !observer.initialised {
                observer.backlog.push(change.clone());
                continue;
            }
            if observer
                .tx
                .send(ObserverMessage::Update(change.clone()))
                .is_err()
            {
                closed.push(*observer_id);
            }
        }
        for observer_id in closed {
            observers.remove(&observer_id);
            let err = BroadcastDeliveryError { observer_id };
            tracing::warn!(error = %err, %observer_id, "update not delivered, observer dropped");
        }
    }

    async fn send_init(&self, observer_id: ObserverId) {
        let state = match self.store.get().await {
            Ok(state) => state,
            Err(err) => {
                tracing::error!(error = %err, %observer_id, "cannot read state for observer, dropping it");
                self.observers.lock().remove(&observer_id);
                return;
            }
        };

        let mut observers = self.observers.lock();
        let Some(observer) = observers.get_mut(&observer_id) else {
            tracing::debug!(%observer_id, "observer left before init");
            return;
        };
        let backlog = std::mem::take(&mut observer.backlog);
        let delivered = std::iter::once(ObserverMessage::Init(state))
            .chain(backlog.into_iter().map(ObserverMessage::Update))
            .try_for_each(|message| observer.tx.send(message));
        match delivered {
            Ok(()) => observer.initialised = true,
            Err(_) => {
                observers.remove(&observer_id);
                let err = BroadcastDeliveryError { observer_id };
                tracing::warn!(error = %err, %observer_id, "init not delivered, observer dropped");
            }
        }
    }
}
