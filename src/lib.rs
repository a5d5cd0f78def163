pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod web;

// Re-export commonly used types
pub use application::AccountService;
pub use domain::{Account, CreateAccountRequest, NewAccount, TransferRequest};
pub use infrastructure::{
    AccountStore, AppConfig, AuthConfig, InMemoryAccountStore, PostgresAccountStore, StoreError,
    TokenService,
};
pub use web::{create_router, AppState};
