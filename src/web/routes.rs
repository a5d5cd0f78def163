use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::AccountService;
use crate::infrastructure::{account_store::AccountStore, auth::TokenService};
use crate::web::handlers::*;
use crate::web::middleware::require_account_token;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store)),
            tokens: Arc::new(tokens),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), require_account_token);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/account",
            get(list_accounts)
                .post(create_account)
                .fallback(method_not_allowed),
        )
        .route(
            "/account/{id}",
            // route_layer only wraps the methods registered before it, so
            // DELETE stays unauthenticated.
            get(get_account_by_id)
                .route_layer(auth)
                .delete(delete_account)
                .fallback(method_not_allowed),
        )
        .route("/transfer/{accountNumber}", any(transfer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
