use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) for generated account numbers.
pub const MAX_ACCOUNT_NUMBER: i64 = 1_000_000;

/// A stored bank account. `id` is assigned by the store, everything else
/// except the names is generated server-side at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Client payload for `POST /account`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Client payload for `/transfer/{accountNumber}`. Accepted and echoed back,
/// never applied to a balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_account: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// An account that has not been persisted yet, so it has no `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            number: generate_account_number(),
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Draws a fresh account number, used after a collision in storage.
    pub fn regenerate_number(&mut self) {
        self.number = generate_account_number();
    }

    /// Attaches the store-assigned id.
    pub fn into_account(self, id: i32) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            number: self.number,
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

impl From<CreateAccountRequest> for NewAccount {
    fn from(req: CreateAccountRequest) -> Self {
        NewAccount::new(req.first_name, req.last_name)
    }
}

pub fn generate_account_number() -> i64 {
    rand::thread_rng().gen_range(0..MAX_ACCOUNT_NUMBER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_new_account_defaults() {
        let account = NewAccount::new("Ada", "Lovelace");
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.last_name, "Lovelace");
        assert_eq!(account.balance, Decimal::ZERO);
        assert!((0..MAX_ACCOUNT_NUMBER).contains(&account.number));
    }

    #[test]
    fn test_generated_numbers_stay_in_range() {
        for _ in 0..1000 {
            let number = generate_account_number();
            assert!(number >= 0 && number < MAX_ACCOUNT_NUMBER);
        }
    }

    #[test]
    fn test_account_wire_shape_is_camel_case() {
        let account = NewAccount::new("Grace", "Hopper").into_account(7);
        let value = serde_json::to_value(&account).unwrap();

        assert_eq!(value["id"], json!(7));
        assert_eq!(value["firstName"], json!("Grace"));
        assert_eq!(value["lastName"], json!("Hopper"));
        assert_eq!(value["number"], json!(account.number));
        assert_eq!(value["balance"].as_f64(), Some(0.0));
        assert!(value["createdAt"].is_string());
        assert!(value.get("first_name").is_none());
    }

    #[test]
    fn test_account_json_round_trip() {
        let mut account = NewAccount::new("Alan", "Turing").into_account(42);
        account.balance = dec!(1234.56);

        let encoded = serde_json::to_string(&account).unwrap();
        let decoded: Account = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_transfer_request_accepts_integer_and_fractional_amounts() {
        let whole: TransferRequest =
            serde_json::from_value(json!({"toAccount": 991122, "amount": 100})).unwrap();
        assert_eq!(whole.to_account, 991122);
        assert_eq!(whole.amount, dec!(100));

        let fractional: TransferRequest =
            serde_json::from_value(json!({"toAccount": 5, "amount": 12.5})).unwrap();
        assert_eq!(fractional.amount, dec!(12.5));

        let echoed = serde_json::to_value(&fractional).unwrap();
        assert_eq!(echoed, json!({"toAccount": 5, "amount": 12.5}));
    }

    #[test]
    fn test_create_request_rejects_wrong_types() {
        let result: Result<CreateAccountRequest, _> =
            serde_json::from_value(json!({"firstName": 1, "lastName": "x"}));
        assert!(result.is_err());
    }
}
