//! State store: sole writer of the singleton [`HomeState`].
//!
//! Every successful mutation writes the field and appends one history entry
//! in a single repository call, then publishes one `STATE_CHANGE` event. A
//! failed storage write leaves the record untouched and publishes nothing.

use std::sync::Arc;

use myhouse_domain::error::MyHouseError;
use myhouse_domain::event::{Cause, StateChange};
use myhouse_domain::field::{FieldUpdate, Switch};
use myhouse_domain::history::HistoryEntry;
use myhouse_domain::home_state::{HomeState, StatePatch};

use crate::event_bus::{Event, EventBus};
use crate::ports::StateRepository;

pub struct StateStore<R> {
    repo: R,
    bus: Arc<EventBus>,
}

impl<R> StateStore<R>
where
    R: StateRepository + Send + Sync,
{
    /// Create a store that persists through `repo` and announces through `bus`.
    pub fn new(repo: R, bus: Arc<EventBus>) -> Self {
        Self { repo, bus }
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Current state, created with defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Storage`] if the repository fails.
    pub async fn get(&self) -> Result<HomeState, MyHouseError> {
        if let Some(state) = self.repo.get_state().await? {
            return Ok(state);
        }
        tracing::debug!("home state absent, creating defaults");
        self.repo.upsert_state(StatePatch::default()).await
    }

    /// Unconditionally write one field on behalf of a command.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Storage`] if the write or the history append
    /// fails. Nothing is published in that case.
    pub async fn set_field(&self, update: FieldUpdate) -> Result<HomeState, MyHouseError> {
        self.set_field_with_cause(update, Cause::Command).await
    }

    /// Unconditionally write one field, tagging the published event with its
    /// cause.
    ///
    /// # Errors
    ///
    /// Same as [`set_field`](Self::set_field).
    #[tracing::instrument(skip(self), fields(field = %update.kind()))]
    pub async fn set_field_with_cause(
        &self,
        update: FieldUpdate,
        cause: Cause,
    ) -> Result<HomeState, MyHouseError> {
        let (state, entry) = self
            .repo
            .record_mutation(
                StatePatch::from(update.clone()),
                update.kind(),
                update.value_string(),
            )
            .await?;
        tracing::debug!(history_id = entry.id, value = %entry.value, "field written");
        self.bus
            .publish(&Event::StateChange(StateChange::new(&update, cause)));
        Ok(state)
    }

    /// Negate a boolean field.
    ///
    /// The read and the write are separate steps. Two concurrent toggles of
    /// the same switch may both read the old value and both write its
    /// negation, leaving two identical history entries.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Storage`] if the repository fails.
    pub async fn toggle_field(&self, switch: Switch) -> Result<HomeState, MyHouseError> {
        let current = self.get().await?.switch(switch);
        self.set_field(switch.set(!current)).await
    }

    /// Most recent history entries first.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Storage`] if the repository fails.
    pub async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, MyHouseError> {
        self.repo.list_history(limit).await
    }

    /// Check that storage is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Storage`] if it is not.
    pub async fn ping(&self) -> Result<(), MyHouseError> {
        self.repo.ping().await
    }
}
