use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use serde::{Deserialize, Serialize};

use seedkit_core::{AccountKind, OperationKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateUserRequest {
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub phone_number: String,
}

impl CreateUserRequest {
    /// Random profile with an email that is unique per call.
    pub fn generated() -> Self {
        Self {
            email: format!("user.{}@example.com", uuid::Uuid::new_v4().simple()),
            last_name: LastName().fake(),
            first_name: FirstName().fake(),
            middle_name: FirstName().fake(),
            phone_number: PhoneNumber().fake(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateUserResponse {
    pub user: UserPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserPayload {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenAccountRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAccountResponse {
    pub account: AccountPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountPayload {
    pub id: String,
    #[serde(default)]
    pub cards: Vec<CardPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CardPayload {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MakeOperationRequest<'a> {
    pub status: &'a str,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<&'a str>,
    pub account_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MakeOperationResponse {
    pub operation: OperationPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationPayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub card_id: Option<String>,
}

pub(crate) const USERS_PATH: &str = "/api/v1/users";

pub(crate) fn open_account_path(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::CreditCard => "/api/v1/accounts/open-credit-card-account",
        AccountKind::DebitCard => "/api/v1/accounts/open-debit-card-account",
        AccountKind::Deposit => "/api/v1/accounts/open-deposit-account",
        AccountKind::Savings => "/api/v1/accounts/open-savings-account",
    }
}

pub(crate) fn make_operation_path(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Purchase => "/api/v1/operations/make-purchase-operation",
        OperationKind::TopUp => "/api/v1/operations/make-top-up-operation",
        OperationKind::Cashback => "/api/v1/operations/make-cashback-operation",
        OperationKind::Transfer => "/api/v1/operations/make-transfer-operation",
        OperationKind::Fee => "/api/v1/operations/make-fee-operation",
        OperationKind::BillPayment => "/api/v1/operations/make-bill-payment-operation",
        OperationKind::CashWithdrawal => "/api/v1/operations/make-cash-withdrawal-operation",
    }
}
