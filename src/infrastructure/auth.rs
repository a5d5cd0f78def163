use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Account;

/// Value written into the `expiredAt` claim when none is configured.
pub const DEFAULT_TOKEN_EXPIRED_AT: i64 = 150_000;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("permission denied")]
    PermissionDenied,
    #[error("token creation error: {0}")]
    TokenCreation(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an account token. `expired_at` is informational only and
/// is never checked during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub account_number: i64,
    pub expired_at: i64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expired_at: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expired_at: DEFAULT_TOKEN_EXPIRED_AT,
        }
    }
}

/// Issues and checks HS256 tokens bound to an account number.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expired_at: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expired_at: config.token_expired_at,
        }
    }

    pub fn issue_token(&self, account: &Account) -> Result<String, AuthError> {
        let claims = Claims {
            account_number: account.number,
            expired_at: self.expired_at,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenCreation)
    }

    /// Checks the signature and algorithm, then returns the decoded claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Requires already validated claims to name the account being accessed.
    pub fn authorize(&self, claims: &Claims, account: &Account) -> Result<(), AuthError> {
        if claims.account_number != account.number {
            return Err(AuthError::PermissionDenied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewAccount;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&AuthConfig::new(secret))
    }

    fn account(number: i64) -> Account {
        let mut account = NewAccount::new("Ada", "Lovelace");
        account.number = number;
        account.into_account(1)
    }

    #[test]
    fn test_issued_token_validates_and_carries_claims() {
        let tokens = service("test-secret");
        let token = tokens.issue_token(&account(424242)).unwrap();

        let claims = tokens.validate_token(&token).unwrap();
        assert_eq!(claims.account_number, 424242);
        assert_eq!(claims.expired_at, DEFAULT_TOKEN_EXPIRED_AT);
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let token = service("secret-a").issue_token(&account(1)).unwrap();
        let err = service("secret-b").validate_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_unexpected_algorithm_is_invalid() {
        let claims = Claims {
            account_number: 1,
            expired_at: 0,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = service("test-secret").validate_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_garbage_and_empty_tokens_are_invalid() {
        let tokens = service("test-secret");
        assert!(matches!(
            tokens.validate_token("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(tokens.validate_token(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_at_claim_is_not_enforced() {
        let tokens = TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_expired_at: 0,
        });
        let token = tokens.issue_token(&account(7)).unwrap();
        assert_eq!(tokens.validate_token(&token).unwrap().expired_at, 0);
    }

    #[test]
    fn test_authorize_binds_token_to_account_number() {
        let tokens = service("test-secret");
        let owner = account(1001);
        let token = tokens.issue_token(&owner).unwrap();
        let claims = tokens.validate_token(&token).unwrap();

        assert!(tokens.authorize(&claims, &owner).is_ok());
        assert!(matches!(
            tokens.authorize(&claims, &account(2002)),
            Err(AuthError::PermissionDenied)
        ));
    }
}
