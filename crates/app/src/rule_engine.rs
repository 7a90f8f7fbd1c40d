//! Rule engine: forward-chaining over a fixed, ordered rule list.
//!
//! The engine subscribes one `STATE_CHANGE` handler. For every change,
//! whatever the field, it re-reads the full state, evaluates every rule's
//! condition against that one snapshot, then applies the matching actions
//! one after the other. Each action is a state store write, which publishes
//! its own `STATE_CHANGE` and so starts a nested pass.
//!
//! Termination relies on rules disarming themselves. An optional maximum
//! cascade depth can be configured; by default there is none.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use myhouse_domain::error::MyHouseError;
use myhouse_domain::event::Cause;
use myhouse_domain::id::SubscriptionId;
use myhouse_domain::rule::{Rule, Snapshot};

use crate::event_bus::{Event, EventKind, Reaction};
use crate::ports::StateRepository;
use crate::state_store::StateStore;

/// A failure contained to one rule within one pass. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum RuleExecutionError {
    #[error("condition of rule {rule} panicked")]
    Condition { rule: &'static str },

    #[error("action of rule {rule} failed")]
    Action {
        rule: &'static str,
        #[source]
        source: MyHouseError,
    },
}

pub struct RuleEngine<R> {
    store: Arc<StateStore<R>>,
    rules: Vec<Rule>,
    max_depth: Option<u32>,
}

impl<R> RuleEngine<R>
where
    R: StateRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<StateStore<R>>, rules: Vec<Rule>) -> Self {
        Self {
            store,
            rules,
            max_depth: None,
        }
    }

    /// Stop cascading once a pass would run at `max_depth` or deeper.
    /// `None` keeps cascades unbounded.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Subscribe the engine to state changes for the lifetime of the bus.
    pub fn start(self) -> (Arc<Self>, SubscriptionId) {
        let engine = Arc::new(self);
        let weak: Weak<Self> = Arc::downgrade(&engine);
        let subscription = engine
            .store
            .bus()
            .subscribe(EventKind::StateChange, move |event| {
                let Event::StateChange(change) = event else {
                    return Reaction::Done;
                };
                let Some(engine) = weak.upgrade() else {
                    return Reaction::Done;
                };
                let depth = change.depth();
                if engine.max_depth.is_some_and(|max| depth >= max) {
                    tracing::warn!(depth, field = %change.kind, "rule cascade depth limit reached, pass skipped");
                    return Reaction::Done;
                }
                Reaction::Pending(Box::pin(async move {
                    if let Err(err) = engine.evaluate(depth).await {
                        tracing::error!(error = %err, depth, "rule pass aborted, state unreadable");
                    }
                }))
            });
        tracing::info!(
            rules = engine.rules.len(),
            max_depth = ?engine.max_depth,
            "rule engine initialised"
        );
        (engine, subscription)
    }

    /// Run one evaluation pass. Returns the ids of the rules whose action
    /// was applied, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Storage`] only if the state cannot be read.
    /// Failures of individual rules are logged and do not end the pass.
    pub async fn evaluate(&self, depth: u32) -> Result<Vec<&'static str>, MyHouseError> {
        let state = self.store.get().await?;
        let snapshot = Snapshot::from(&state);
        let matched: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| check(rule, &snapshot))
            .collect();

        let mut fired = Vec::with_capacity(matched.len());
        for rule in matched {
            tracing::info!(rule = rule.id, depth, "rule fired");
            let cause = Cause::Rule {
                rule_id: rule.id,
                depth: depth + 1,
            };
            match self
                .store
                .set_field_with_cause(rule.action.clone(), cause)
                .await
            {
                Ok(_) => fired.push(rule.id),
                Err(source) => {
                    let err = RuleExecutionError::Action {
                        rule: rule.id,
                        source,
                    };
                    tracing::error!(error = %err, rule = rule.id, depth, "rule execution failed");
                }
            }
        }
        Ok(fired)
    }
}

fn check(rule: &Rule, snapshot: &Snapshot) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.matches(snapshot))) {
        Ok(matched) => matched,
        Err(_) => {
            let err = RuleExecutionError::Condition { rule: rule.id };
            tracing::error!(error = %err, rule = rule.id, "rule execution failed");
            false
        }
    }
}
