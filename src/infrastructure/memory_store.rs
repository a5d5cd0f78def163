use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicI32, Ordering};

use crate::domain::{Account, NewAccount};
use crate::infrastructure::account_store::{AccountStore, StoreError};

/// Process-local store with the same contract as the Postgres one: ids start
/// at 1 and only grow, account numbers are unique.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: DashMap<i32, Account>,
    numbers: DashMap<i64, i32>,
    next_id: AtomicI32,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            numbers: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(&self, account: &NewAccount) -> Result<Account, StoreError> {
        // Reserve the number first so concurrent creates cannot share it.
        let id = match self.numbers.entry(account.number) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateNumber(account.number)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(id);
                id
            }
        };

        let stored = account.clone().into_account(id);
        self.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_account(&self, id: i32) -> Result<(), StoreError> {
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.numbers.remove(&account.number);
        }
        Ok(())
    }

    async fn update_account(&self, _account: &Account) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, StoreError> {
        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(id))
    }
}
