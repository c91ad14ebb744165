use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Account products the gateway can open for a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    CreditCard,
    DebitCard,
    Deposit,
    Savings,
}

impl AccountKind {
    pub const ALL: [AccountKind; 4] = [
        AccountKind::CreditCard,
        AccountKind::DebitCard,
        AccountKind::Deposit,
        AccountKind::Savings,
    ];

    /// Wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::CreditCard => "CREDIT_CARD",
            AccountKind::DebitCard => "DEBIT_CARD",
            AccountKind::Deposit => "DEPOSIT",
            AccountKind::Savings => "SAVINGS",
        }
    }

    /// Returns true for products that are opened together with a card.
    pub fn issues_cards(self) -> bool {
        matches!(self, AccountKind::CreditCard | AccountKind::DebitCard)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations that can be recorded against an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Purchase,
    TopUp,
    Cashback,
    Transfer,
    Fee,
    BillPayment,
    CashWithdrawal,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Purchase,
        OperationKind::TopUp,
        OperationKind::Cashback,
        OperationKind::Transfer,
        OperationKind::Fee,
        OperationKind::BillPayment,
        OperationKind::CashWithdrawal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Purchase => "PURCHASE",
            OperationKind::TopUp => "TOP_UP",
            OperationKind::Cashback => "CASHBACK",
            OperationKind::Transfer => "TRANSFER",
            OperationKind::Fee => "FEE",
            OperationKind::BillPayment => "BILL_PAYMENT",
            OperationKind::CashWithdrawal => "CASH_WITHDRAWAL",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
