//! Durable fixture cache keyed by scenario name.
//!
//! Each scenario keeps only its most recent result tree. Writes replace the
//! previous entry atomically; there is no expiry and no history.

mod atomic;
pub mod errors;
pub mod file;
pub mod memory;
pub mod store;

pub use errors::{StoreError, StoreResult};
pub use file::FileFixtureStore;
pub use memory::MemoryFixtureStore;
pub use store::{FIXTURE_FORMAT_VERSION, FixtureRecord, FixtureStore, validate_scenario_name};
