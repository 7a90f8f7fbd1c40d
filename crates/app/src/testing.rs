//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use myhouse_domain::credential::{ClientCredential, ClientId};
use myhouse_domain::error::{CipherError, MyHouseError};
use myhouse_domain::field::FieldKind;
use myhouse_domain::history::HistoryEntry;
use myhouse_domain::home_state::{HomeState, StatePatch};
use myhouse_domain::time::now;

use crate::ports::{CredentialRepository, StateRepository, TokenCipher};

#[derive(Debug, thiserror::Error)]
#[error("simulated storage failure")]
pub struct SimulatedFailure;

#[derive(Default)]
pub struct InMemoryStateRepo {
    state: Mutex<Option<HomeState>>,
    history: Mutex<Vec<HistoryEntry>>,
    fail_writes: AtomicBool,
    fail_history: AtomicBool,
}

impl InMemoryStateRepo {
    pub fn with_state(state: HomeState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Reject history appends while still accepting plain state writes.
    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Option<HomeState> {
        self.state.lock().unwrap().clone()
    }

    /// History in creation order.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), MyHouseError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MyHouseError::Storage(Box::new(SimulatedFailure)));
        }
        Ok(())
    }
}

impl StateRepository for InMemoryStateRepo {
    fn get_state(&self) -> impl Future<Output = Result<Option<HomeState>, MyHouseError>> + Send {
        let result = self.state.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn upsert_state(
        &self,
        patch: StatePatch,
    ) -> impl Future<Output = Result<HomeState, MyHouseError>> + Send {
        let result = self.check_writable().map(|()| {
            let mut state = self.state.lock().unwrap();
            let current = state.get_or_insert_with(HomeState::default);
            current.apply(&patch);
            current.clone()
        });
        async { result }
    }

    fn record_mutation(
        &self,
        patch: StatePatch,
        kind: FieldKind,
        value: String,
    ) -> impl Future<Output = Result<(HomeState, HistoryEntry), MyHouseError>> + Send {
        let result = self.check_writable().and_then(|()| {
            if self.fail_history.load(Ordering::SeqCst) {
                return Err(MyHouseError::Storage(Box::new(SimulatedFailure)));
            }
            let mut state = self.state.lock().unwrap();
            let mut history = self.history.lock().unwrap();
            let current = state.get_or_insert_with(HomeState::default);
            current.apply(&patch);
            let entry = HistoryEntry {
                id: i64::try_from(history.len()).unwrap() + 1,
                kind,
                value,
                created_at: now(),
            };
            history.push(entry.clone());
            Ok((current.clone(), entry))
        });
        async { result }
    }

    fn list_history(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, MyHouseError>> + Send {
        let history = self.history.lock().unwrap();
        let result: Vec<HistoryEntry> = history
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}

#[derive(Default)]
pub struct InMemoryCredentialRepo {
    store: Mutex<HashMap<ClientId, ClientCredential>>,
}

impl InMemoryCredentialRepo {
    pub fn insert(&self, client_id: &str, encrypted_token: &str) {
        let client_id = ClientId::new(client_id).unwrap();
        self.store.lock().unwrap().insert(
            client_id.clone(),
            ClientCredential {
                client_id,
                encrypted_token: encrypted_token.to_string(),
            },
        );
    }
}

impl CredentialRepository for InMemoryCredentialRepo {
    fn find_credential(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Option<ClientCredential>, MyHouseError>> + Send {
        let result = self.store.lock().unwrap().get(client_id).cloned();
        async { Ok(result) }
    }

    fn upsert_credential(
        &self,
        credential: ClientCredential,
    ) -> impl Future<Output = Result<ClientCredential, MyHouseError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(credential.client_id.clone(), credential.clone());
        async { Ok(credential) }
    }
}

/// Reversible, non-randomised stand-in: `enc:` followed by the reversed text.
#[derive(Clone, Copy, Default)]
pub struct ReversingCipher;

impl TokenCipher for ReversingCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(format!("enc:{}", plaintext.chars().rev().collect::<String>()))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        ciphertext
            .strip_prefix("enc:")
            .map(|body| body.chars().rev().collect())
            .ok_or_else(|| CipherError::new("missing enc: prefix"))
    }
}
