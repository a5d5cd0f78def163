use async_trait::async_trait;
use sqlx::{
    postgres::{PgDatabaseError, PgPoolOptions},
    PgPool,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, number, balance, created_at";
const NUMBER_UNIQUE_CONSTRAINT: &str = "accounts_number_key";
const SCHEMA_LOCK_KEY: i64 = 0x676f_6261_6e6b;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("account {0} not found")]
    NotFound(i32),
    #[error("account number {0} already exists")]
    DuplicateNumber(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence boundary for accounts. Handlers only ever see copies of the
/// rows returned here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Inserts the account and returns the stored row, including its id.
    async fn create_account(&self, account: &NewAccount) -> Result<Account, StoreError>;
    /// Removes the row. Deleting an id that does not exist is not an error.
    async fn delete_account(&self, id: i32) -> Result<(), StoreError>;
    /// Not implemented yet; always succeeds without touching storage.
    async fn update_account(&self, account: &Account) -> Result<(), StoreError>;
    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError>;
    async fn get_account_by_id(&self, id: i32) -> Result<Account, StoreError>;
}

#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        info!(max_connections, "connected to postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the accounts table if it is missing. Safe to run on every start,
    /// including from several processes at once.
    pub async fn init(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id SERIAL PRIMARY KEY,
                first_name VARCHAR(100) NOT NULL,
                last_name VARCHAR(100) NOT NULL,
                number BIGINT UNIQUE,
                encrypted_password VARCHAR(100),
                balance NUMERIC(10, 2) NOT NULL DEFAULT 0.00,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn create_account(&self, account: &NewAccount) -> Result<Account, StoreError> {
        let query = format!(
            "INSERT INTO accounts (first_name, last_name, number, balance, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.number)
            .bind(account.balance)
            .bind(account.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                if let Some(db_err) = e.as_database_error() {
                    if let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>() {
                        // unique_violation
                        if pg_err.code() == "23505"
                            && pg_err.constraint() == Some(NUMBER_UNIQUE_CONSTRAINT)
                        {
                            return StoreError::DuplicateNumber(account.number);
                        }
                    }
                }
                StoreError::Database(e)
            })
    }

    async fn delete_account(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(id, rows_affected = result.rows_affected(), "deleted account");
        Ok(())
    }

    async fn update_account(&self, _account: &Account) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id");
        let accounts = sqlx::query_as::<_, Account>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}
