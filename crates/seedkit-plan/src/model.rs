use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use seedkit_core::{AccountKind, OperationKind};

/// Number of operations of one kind to record per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OperationCountPlan {
    pub count: u64,
}

impl OperationCountPlan {
    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

/// Accounts of one kind to open for every user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AccountPlan {
    /// Account product to open.
    pub kind: AccountKind,
    /// Accounts of this kind per user.
    pub count: u64,
    /// Operations to record on each account, keyed by kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub operations: BTreeMap<OperationKind, OperationCountPlan>,
}

impl AccountPlan {
    pub fn new(kind: AccountKind, count: u64) -> Self {
        Self {
            kind,
            count,
            operations: BTreeMap::new(),
        }
    }

    /// Set the per-account count for an operation kind.
    pub fn with_operations(mut self, kind: OperationKind, count: u64) -> Self {
        self.operations.insert(kind, OperationCountPlan::new(count));
        self
    }

    /// Sum of operation counts recorded on each account of this plan.
    pub fn operations_per_account(&self) -> Option<u64> {
        self.operations
            .values()
            .try_fold(0_u64, |total, plan| total.checked_add(plan.count))
    }

    /// Expand the operation map into per-account work in kind order.
    pub fn operation_sequence(&self) -> Vec<OperationKind> {
        let mut sequence = Vec::new();
        for (kind, plan) in &self.operations {
            for _ in 0..plan.count {
                sequence.push(*kind);
            }
        }
        sequence
    }
}

/// Users to create, each with the same account layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UsersPlan {
    /// Number of users to create.
    pub count: u64,
    /// One entry per account kind opened for every user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountPlan>,
}

impl UsersPlan {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            accounts: Vec::new(),
        }
    }

    pub fn with_account(mut self, account: AccountPlan) -> Self {
        self.accounts.push(account);
        self
    }

    /// Accounts opened for each user across all kinds.
    pub fn accounts_per_user(&self) -> Option<u64> {
        self.accounts
            .iter()
            .try_fold(0_u64, |total, plan| total.checked_add(plan.count))
    }

    /// Operations recorded for each user across all of their accounts.
    pub fn operations_per_user(&self) -> Option<u64> {
        self.accounts.iter().try_fold(0_u64, |total, plan| {
            let per_account = plan.operations_per_account()?;
            total.checked_add(plan.count.checked_mul(per_account)?)
        })
    }
}

/// Canonical seeding plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub users: UsersPlan,
}

/// Planned item counts per dependency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanTotals {
    pub users: u64,
    pub accounts: u64,
    pub operations: u64,
}

impl PlanTotals {
    /// Total planned items. Cards are a side effect and are not counted.
    pub fn items(&self) -> u64 {
        self.users
            .saturating_add(self.accounts)
            .saturating_add(self.operations)
    }
}

impl Plan {
    pub fn new(users: UsersPlan) -> Self {
        Self { users }
    }

    /// Copy of the plan with every zero-count entry removed.
    pub fn normalized(&self) -> Plan {
        let accounts = self
            .users
            .accounts
            .iter()
            .filter(|account| account.count > 0)
            .map(|account| AccountPlan {
                kind: account.kind,
                count: account.count,
                operations: account
                    .operations
                    .iter()
                    .filter(|(_, plan)| plan.count > 0)
                    .map(|(kind, plan)| (*kind, *plan))
                    .collect(),
            })
            .collect();

        Plan {
            users: UsersPlan {
                count: self.users.count,
                accounts,
            },
        }
    }

    /// Planned counts per level, or `None` when they overflow `u64`.
    pub fn totals(&self) -> Option<PlanTotals> {
        let users = self.users.count;
        let accounts = users.checked_mul(self.users.accounts_per_user()?)?;
        let operations = users.checked_mul(self.users.operations_per_user()?)?;
        let totals = PlanTotals {
            users,
            accounts,
            operations,
        };
        users.checked_add(accounts)?.checked_add(operations)?;
        Some(totals)
    }

    pub fn is_empty(&self) -> bool {
        self.users.count == 0
    }
}
