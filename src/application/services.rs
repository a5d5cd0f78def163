use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Account, CreateAccountRequest, NewAccount};
use crate::infrastructure::account_store::{AccountStore, StoreError};

/// How many account numbers are tried before a create gives up.
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Account operations used by the HTTP layer.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Creates an account with a random number, drawing a new number when
    /// storage reports a collision.
    pub async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<Account, StoreError> {
        let mut new_account = NewAccount::from(request);
        let mut attempt = 1;
        loop {
            match self.store.create_account(&new_account).await {
                Ok(account) => {
                    info!(id = account.id, number = account.number, "created account");
                    return Ok(account);
                }
                Err(StoreError::DuplicateNumber(number)) if attempt < MAX_NUMBER_ATTEMPTS => {
                    warn!(number, attempt, "account number collision, retrying");
                    new_account.regenerate_number();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.store.get_accounts().await
    }

    pub async fn get_account(&self, id: i32) -> Result<Account, StoreError> {
        self.store.get_account_by_id(id).await
    }

    /// Deletes without checking that the account existed.
    pub async fn delete_account(&self, id: i32) -> Result<(), StoreError> {
        self.store.delete_account(id).await?;
        info!(id, "deleted account");
        Ok(())
    }
}
