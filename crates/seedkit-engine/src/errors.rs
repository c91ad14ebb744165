use thiserror::Error;

use seedkit_plan::ValidationReport;
use seedkit_store::StoreError;

/// Errors that stop a run before any gateway call is made.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid plan: {0}")]
    InvalidPlan(ValidationReport),
    #[error("invalid engine options: {0}")]
    InvalidOptions(String),
}

/// Hard failures of a scenario build. Per-item failures are not errors here;
/// they are reported in `SeedReport::errors`.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("fixture store error: {0}")]
    Store(#[from] StoreError),
}
