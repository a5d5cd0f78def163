use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::infrastructure::{account_store::StoreError, auth::AuthError};

/// Every failure a handler or the auth middleware can return. Rendered as
/// `{"error": <message>}`; auth failures are 403, everything else 400.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid id given {0}")]
    InvalidId(String),
    #[error("invalid path parameter: {0}")]
    InvalidPath(String),
    #[error("invalid request body: {0}")]
    Decode(String),
    #[error("method not allowed {0}")]
    MethodNotAllowed(Method),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::InvalidToken | AuthError::PermissionDenied) => {
                StatusCode::FORBIDDEN
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "request failed");
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// JSON request body that turns decode failures into the 400 envelope.
/// Unlike `axum::Json` it does not insist on a `Content-Type` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Decode(rejection.body_text()))?;
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Single path segment as a string. Undecodable segments (bad percent
/// encoding, invalid UTF-8) become the 400 envelope instead of axum's plain
/// text rejection.
#[derive(Debug, Clone)]
pub struct PathParam(pub String);

impl<S> FromRequestParts<S> for PathParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<String>::from_request_parts(parts, state)
            .await
            .map(|Path(raw)| PathParam(raw))
            .map_err(|rejection| ApiError::InvalidPath(rejection.body_text()))
    }
}
