use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seedkit_core::ResultTree;

use crate::errors::{StoreError, StoreResult};

pub const FIXTURE_FORMAT_VERSION: &str = "0.1";

/// Envelope persisted for each scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub format_version: String,
    pub scenario: String,
    pub seeded_at: DateTime<Utc>,
    pub tree: ResultTree,
}

impl FixtureRecord {
    pub fn new(scenario: &str, tree: ResultTree) -> Self {
        Self {
            format_version: FIXTURE_FORMAT_VERSION.to_string(),
            scenario: scenario.to_string(),
            seeded_at: Utc::now(),
            tree,
        }
    }
}

/// Latest result tree per scenario name.
///
/// `write` fully replaces any previous entry and is exclusive per name;
/// `read` never observes a partially written tree.
pub trait FixtureStore: Send + Sync {
    fn write(&self, name: &str, tree: &ResultTree) -> StoreResult<()>;

    fn read(&self, name: &str) -> StoreResult<ResultTree> {
        self.read_record(name).map(|record| record.tree)
    }

    fn read_record(&self, name: &str) -> StoreResult<FixtureRecord>;

    /// Stored scenario names, sorted.
    fn list(&self) -> StoreResult<Vec<String>>;
}

/// Scenario names double as file names: `[A-Za-z0-9_.-]`, not starting with `.`.
pub fn validate_scenario_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
