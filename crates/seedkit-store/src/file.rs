use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LockResult, Mutex, MutexGuard};

use tracing::info;

use seedkit_core::ResultTree;

use crate::atomic::write_json_atomic;
use crate::errors::{StoreError, StoreResult};
use crate::store::{FixtureRecord, FixtureStore, validate_scenario_name};

const FIXTURE_EXTENSION: &str = "json";

/// One JSON file per scenario under a root directory.
#[derive(Debug)]
pub struct FileFixtureStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileFixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{FIXTURE_EXTENSION}"))
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = recover(self.locks.lock());
        Arc::clone(locks.entry(name.to_string()).or_default())
    }
}

fn recover<'a, T>(result: LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    match result {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl FixtureStore for FileFixtureStore {
    fn write(&self, name: &str, tree: &ResultTree) -> StoreResult<()> {
        validate_scenario_name(name)?;
        let lock = self.lock_for(name);
        let _guard = recover(lock.lock());

        let path = self.path_for(name);
        let record = FixtureRecord::new(name, tree.clone());
        write_json_atomic(&path, &record)?;

        info!(
            event = "fixture_written",
            scenario = name,
            path = %path.display(),
            users = tree.user_count(),
            accounts = tree.account_count(),
            operations = tree.operation_count()
        );
        Ok(())
    }

    fn read_record(&self, name: &str) -> StoreResult<FixtureRecord> {
        validate_scenario_name(name)?;
        let path = self.path_for(name);
        let contents = match std::fs::read(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(err) => return Err(StoreError::Io(err)),
        };
        Ok(serde_json::from_slice(&contents)?)
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FIXTURE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_scenario_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use seedkit_core::{SeededUser, UserNode};

    fn temp_store(label: &str) -> FileFixtureStore {
        let mut dir = std::env::temp_dir();
        dir.push(format!("seedkit_store_{label}_{}", uuid::Uuid::new_v4()));
        FileFixtureStore::new(dir)
    }

    fn tree_with_users(ids: &[&str]) -> ResultTree {
        ResultTree {
            users: ids
                .iter()
                .map(|id| UserNode {
                    user: SeededUser {
                        id: id.to_string(),
                        email: format!("{id}@example.com"),
                        created_at: Utc::now(),
                    },
                    accounts: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn write_then_read_returns_tree() {
        let store = temp_store("roundtrip");
        let tree = tree_with_users(&["u1", "u2"]);
        store.write("smoke", &tree).expect("write fixture");

        let read = store.read("smoke").expect("read fixture");
        assert_eq!(read, tree);

        let record = store.read_record("smoke").expect("read record");
        assert_eq!(record.scenario, "smoke");
        assert_eq!(record.format_version, crate::FIXTURE_FORMAT_VERSION);
    }

    #[test]
    fn second_write_replaces_first() {
        let store = temp_store("overwrite");
        store
            .write("smoke", &tree_with_users(&["first"]))
            .expect("first write");
        store
            .write("smoke", &tree_with_users(&["second-a", "second-b"]))
            .expect("second write");

        let read = store.read("smoke").expect("read fixture");
        assert_eq!(read.user_count(), 2);
        assert!(read.find_user("first").is_none());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let store = temp_store("missing");
        assert!(matches!(
            store.read("never_seeded"),
            Err(StoreError::NotFound(name)) if name == "never_seeded"
        ));
    }

    #[test]
    fn list_skips_temp_and_foreign_files() {
        let store = temp_store("list");
        store.write("b_scenario", &ResultTree::new()).expect("write b");
        store.write("a_scenario", &ResultTree::new()).expect("write a");
        std::fs::write(store.root().join(".a_scenario.json.abc.tmp"), b"{").expect("temp file");
        std::fs::write(store.root().join("notes.txt"), b"hello").expect("foreign file");

        assert_eq!(
            store.list().expect("list"),
            vec!["a_scenario".to_string(), "b_scenario".to_string()]
        );
    }

    #[test]
    fn concurrent_writes_leave_one_complete_tree() {
        let store = Arc::new(temp_store("concurrent"));
        let handles: Vec<_> = (0..8)
            .map(|idx| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let ids: Vec<String> = (0..=idx).map(|n| format!("w{idx}-u{n}")).collect();
                    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
                    store.write("shared", &tree_with_users(&refs))
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread").expect("write fixture");
        }

        let tree = store.read("shared").expect("read fixture");
        let writer = tree.users[0]
            .user
            .id
            .split('-')
            .next()
            .expect("writer prefix")
            .to_string();
        assert!(tree.users.iter().all(|node| node.user.id.starts_with(&writer)));
        let expected: usize = writer.trim_start_matches('w').parse::<usize>().expect("idx") + 1;
        assert_eq!(tree.user_count(), expected);
    }

    #[test]
    fn missing_root_lists_nothing() {
        let store = temp_store("empty");
        assert!(store.list().expect("list").is_empty());
    }
}
