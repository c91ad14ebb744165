//! Seeding engine: turns a plan into gateway calls and a result tree.
//!
//! Work runs in three waves (users, accounts, operations). Each wave is
//! drained before the next one starts, and a failed item only drops its own
//! subtree.

mod amounts;
pub mod cancel;
pub mod engine;
pub mod errors;
pub mod model;
pub mod scenario;

pub use cancel::CancelToken;
pub use engine::SeedingEngine;
pub use errors::{EngineError, ScenarioError};
pub use model::{
    EngineOptions, ItemKind, LevelSummary, SeedCause, SeedError, SeedOutcome, SeedStage,
    SeedSummary,
};
pub use scenario::{Scenario, SeedContext, SeedReport};
