pub mod account_store;
pub mod auth;
pub mod config;
pub mod logging;
pub mod memory_store;

pub use account_store::{AccountStore, PostgresAccountStore, StoreError};
pub use auth::{AuthConfig, AuthError, Claims, TokenService};
pub use config::{AppConfig, StorageBackend};
pub use memory_store::InMemoryAccountStore;
