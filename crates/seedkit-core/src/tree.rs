use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kinds::{AccountKind, OperationKind};

/// User created by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Account opened for a user, with the cards issued alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededAccount {
    pub id: String,
    pub kind: AccountKind,
    pub owner_user_id: String,
    /// Cards issued by the account call, in response order (may be empty).
    #[serde(default)]
    pub card_ids: Vec<String>,
}

/// Operation recorded against an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededOperation {
    pub id: String,
    pub kind: OperationKind,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    pub amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    pub account: SeededAccount,
    #[serde(default)]
    pub operations: Vec<SeededOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNode {
    pub user: SeededUser,
    #[serde(default)]
    pub accounts: Vec<AccountNode>,
}

/// Identifiers produced by a seeding run, nested the same way as the plan.
///
/// Users, accounts and operations appear in plan order. Only fully created
/// entities are present; failed or cancelled items are reported separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTree {
    pub users: Vec<UserNode>,
}

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn account_count(&self) -> usize {
        self.users.iter().map(|node| node.accounts.len()).sum()
    }

    pub fn card_count(&self) -> usize {
        self.account_nodes()
            .map(|node| node.account.card_ids.len())
            .sum()
    }

    pub fn operation_count(&self) -> usize {
        self.account_nodes().map(|node| node.operations.len()).sum()
    }

    /// Users + accounts + operations. Cards are not planned items.
    pub fn item_count(&self) -> usize {
        self.user_count() + self.account_count() + self.operation_count()
    }

    pub fn find_user(&self, id: &str) -> Option<&UserNode> {
        self.users.iter().find(|node| node.user.id == id)
    }

    /// Iterate every account node of the given kind across all users.
    pub fn accounts(&self, kind: AccountKind) -> impl Iterator<Item = &AccountNode> + '_ {
        self.account_nodes()
            .filter(move |node| node.account.kind == kind)
    }

    /// Iterate every operation of the given kind across all accounts.
    pub fn operations(&self, kind: OperationKind) -> impl Iterator<Item = &SeededOperation> + '_ {
        self.account_nodes()
            .flat_map(|node| node.operations.iter())
            .filter(move |operation| operation.kind == kind)
    }

    fn account_nodes(&self) -> impl Iterator<Item = &AccountNode> + '_ {
        self.users.iter().flat_map(|node| node.accounts.iter())
    }
}
