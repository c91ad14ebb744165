use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seedkit_core::{AccountKind, OperationKind, ResultTree};
use seedkit_gateway::TransportError;
use seedkit_plan::PlanTotals;

/// Options for the seeding engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Maximum gateway calls in flight within a wave. `1` runs sequentially.
    pub concurrency: usize,
    /// Stop issuing new calls once the run has lasted this long.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_budget: Option<Duration>,
    /// Seed for operation amounts. `None` draws fresh amounts each run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            run_budget: None,
            seed: None,
        }
    }
}

/// Dependency level of a planned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStage {
    User,
    Account,
    Operation,
}

impl fmt::Display for SeedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeedStage::User => "user",
            SeedStage::Account => "account",
            SeedStage::Operation => "operation",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemKind {
    Account(AccountKind),
    Operation(OperationKind),
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Account(kind) => fmt::Display::fmt(kind, f),
            ItemKind::Operation(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "cause", content = "error", rename_all = "snake_case")]
pub enum SeedCause {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The run was cancelled or ran out of budget before this item was tried.
    #[error("not attempted: run was cancelled")]
    Cancelled,
}

/// A planned item that did not make it into the result tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedError {
    pub stage: SeedStage,
    /// Id of the parent entity when it exists (user for accounts, account
    /// for operations).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    pub cause: SeedCause,
}

impl SeedError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, SeedCause::Cancelled)
    }
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stage)?;
        if let Some(kind) = &self.kind {
            write!(f, " {kind}")?;
        }
        if let Some(parent) = &self.parent_id {
            write!(f, " under {parent}")?;
        }
        write!(f, ": {}", self.cause)
    }
}

/// Planned vs. produced counts for one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub planned: u64,
    pub created: u64,
    pub failed: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub users: LevelSummary,
    pub accounts: LevelSummary,
    pub operations: LevelSummary,
}

impl SeedSummary {
    pub fn new(totals: PlanTotals, tree: &ResultTree, errors: &[SeedError]) -> Self {
        let level = |stage: SeedStage, planned: u64, created: usize| {
            let mut summary = LevelSummary {
                planned,
                created: created as u64,
                ..LevelSummary::default()
            };
            for error in errors.iter().filter(|error| error.stage == stage) {
                if error.is_cancelled() {
                    summary.cancelled += 1;
                } else {
                    summary.failed += 1;
                }
            }
            summary
        };

        Self {
            users: level(SeedStage::User, totals.users, tree.user_count()),
            accounts: level(SeedStage::Account, totals.accounts, tree.account_count()),
            operations: level(
                SeedStage::Operation,
                totals.operations,
                tree.operation_count(),
            ),
        }
    }
}

/// Result of a seeding run: the (possibly partial) tree and every item that
/// is missing from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub run_id: String,
    pub tree: ResultTree,
    pub errors: Vec<SeedError>,
    pub summary: SeedSummary,
}
