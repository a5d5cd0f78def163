use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::web::envelope::{ApiError, PathParam};
use crate::web::handlers::parse_id;
use crate::web::routes::AppState;

/// Header carrying the account token.
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// Guards `/account/{id}`: the id must parse, the token must verify, and the
/// token's account number must match the addressed account. On success the
/// loaded `Account` is passed to the handler as a request extension.
pub async fn require_account_token(
    State(state): State<AppState>,
    PathParam(raw_id): PathParam,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;

    let claims = {
        let token = req
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        state.tokens.validate_token(token)?
    };

    let account = state.accounts.get_account(id).await?;
    state.tokens.authorize(&claims, &account)?;
    debug!(id, account_number = claims.account_number, "token accepted");

    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}
