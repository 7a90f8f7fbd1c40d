//! State repository port: persistence for the singleton home state and its
//! history.

use std::future::Future;
use std::sync::Arc;

use myhouse_domain::error::MyHouseError;
use myhouse_domain::field::FieldKind;
use myhouse_domain::history::HistoryEntry;
use myhouse_domain::home_state::{HomeState, StatePatch};

/// Storage collaborator for [`HomeState`] and [`HistoryEntry`] records.
///
/// Every operation targets the record keyed by
/// [`HOME_STATE_ID`](myhouse_domain::home_state::HOME_STATE_ID).
pub trait StateRepository {
    /// Read the singleton record, if it has been created.
    fn get_state(&self) -> impl Future<Output = Result<Option<HomeState>, MyHouseError>> + Send;

    /// Write the patched fields, creating the record with defaults first when
    /// it does not exist. Returns the record as stored after the write.
    fn upsert_state(
        &self,
        patch: StatePatch,
    ) -> impl Future<Output = Result<HomeState, MyHouseError>> + Send;

    /// Apply `patch` and append one history entry for it as a single unit.
    ///
    /// Either both writes land or neither does: on error the stored record
    /// and the history are left as they were.
    fn record_mutation(
        &self,
        patch: StatePatch,
        kind: FieldKind,
        value: String,
    ) -> impl Future<Output = Result<(HomeState, HistoryEntry), MyHouseError>> + Send;

    /// Most recent entries first.
    fn list_history(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, MyHouseError>> + Send;

    /// Check that the backing store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), MyHouseError>> + Send {
        async { Ok(()) }
    }
}

impl<T: StateRepository + Send + Sync> StateRepository for Arc<T> {
    fn get_state(&self) -> impl Future<Output = Result<Option<HomeState>, MyHouseError>> + Send {
        (**self).get_state()
    }

    fn upsert_state(
        &self,
        patch: StatePatch,
    ) -> impl Future<Output = Result<HomeState, MyHouseError>> + Send {
        (**self).upsert_state(patch)
    }

    fn record_mutation(
        &self,
        patch: StatePatch,
        kind: FieldKind,
        value: String,
    ) -> impl Future<Output = Result<(HomeState, HistoryEntry), MyHouseError>> + Send {
        (**self).record_mutation(patch, kind, value)
    }

    fn list_history(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, MyHouseError>> + Send {
        (**self).list_history(limit)
    }

    fn ping(&self) -> impl Future<Output = Result<(), MyHouseError>> + Send {
        (**self).ping()
    }
}
