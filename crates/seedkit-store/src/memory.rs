use std::collections::BTreeMap;
use std::sync::RwLock;

use seedkit_core::ResultTree;

use crate::errors::{StoreError, StoreResult};
use crate::store::{FixtureRecord, FixtureStore, validate_scenario_name};

/// Process-local store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryFixtureStore {
    records: RwLock<BTreeMap<String, FixtureRecord>>,
}

impl MemoryFixtureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FixtureStore for MemoryFixtureStore {
    fn write(&self, name: &str, tree: &ResultTree) -> StoreResult<()> {
        validate_scenario_name(name)?;
        let record = FixtureRecord::new(name, tree.clone());
        let mut records = match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.insert(name.to_string(), record);
        Ok(())
    }

    fn read_record(&self, name: &str) -> StoreResult<FixtureRecord> {
        validate_scenario_name(name)?;
        let records = match self.records.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let records = match self.records.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_of_unknown_name_fails() {
        let store = MemoryFixtureStore::new();
        assert!(matches!(store.read("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn write_overwrites_and_lists() {
        let store = MemoryFixtureStore::new();
        store.write("one", &ResultTree::new()).expect("write");
        store.write("one", &ResultTree::new()).expect("overwrite");
        store.write("two", &ResultTree::new()).expect("write");
        assert_eq!(store.list().expect("list"), vec!["one", "two"]);
    }
}
