//! In-memory store used by tests and dry runs.
//!
//! Records every write in call order so sequencing can be asserted, and can be
//! told to reject writes by value name or by key path to exercise failure
//! paths. Key paths and value names are case-insensitive, like the registry.

use super::{KeyValueStore, RegistryRoot, StoreError, StoreResult, StoreWrite};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct KeyNode {
    default_value: Option<String>,
    /// Folded name -> (first spelling written, data).
    values: BTreeMap<String, (String, String)>,
}

/// Write recorded by `InMemoryStore`, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub root: RegistryRoot,
    pub write: StoreWrite,
}

/// One key in a store snapshot: path, default value, sorted named values.
pub type KeySnapshot = (String, Option<String>, Vec<(String, String)>);

/// Single-threaded in-memory key tree.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    keys: RefCell<BTreeMap<(RegistryRoot, String), KeyNode>>,
    log: RefCell<Vec<RecordedWrite>>,
    rejected_names: RefCell<BTreeSet<String>>,
    rejected_paths: RefCell<BTreeSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent named-value writes called `name` fail.
    pub fn fail_writes_to_name(&self, name: &str) {
        self.rejected_names.borrow_mut().insert(fold(name));
    }

    /// Makes every subsequent write to the key at `path` fail, default value
    /// included.
    pub fn fail_writes_to_path(&self, path: &str) {
        self.rejected_paths.borrow_mut().insert(normalize_path(path));
    }

    /// Returns all successful writes in the order they happened.
    pub fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.log.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Forgets the write log but keeps stored values.
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn key_exists(&self, root: RegistryRoot, path: &str) -> bool {
        self.keys.borrow().contains_key(&(root, normalize_path(path)))
    }

    pub fn default_value(&self, root: RegistryRoot, path: &str) -> Option<String> {
        self.keys
            .borrow()
            .get(&(root, normalize_path(path)))
            .and_then(|node| node.default_value.clone())
    }

    pub fn named_value(&self, root: RegistryRoot, path: &str, name: &str) -> Option<String> {
        self.keys
            .borrow()
            .get(&(root, normalize_path(path)))
            .and_then(|node| {
                node.values
                    .get(&fold(name))
                    .map(|(_, data)| data.clone())
            })
    }

    /// Returns value names stored under `path`, sorted case-insensitively,
    /// in the spelling they were first written with.
    pub fn value_names(&self, root: RegistryRoot, path: &str) -> Vec<String> {
        self.keys
            .borrow()
            .get(&(root, normalize_path(path)))
            .map(|node| node.values.values().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns a comparable snapshot of every key under `root`.
    pub fn snapshot(&self, root: RegistryRoot) -> Vec<KeySnapshot> {
        self.keys
            .borrow()
            .iter()
            .filter(|((key_root, _), _)| *key_root == root)
            .map(|((_, path), node)| {
                (
                    path.clone(),
                    node.default_value.clone(),
                    node.values.values().cloned().collect(),
                )
            })
            .collect()
    }

    /// `name` is empty for the default value.
    fn check_rejected(&self, root: RegistryRoot, path: &str, name: &str) -> StoreResult<()> {
        let name_rejected =
            !name.is_empty() && self.rejected_names.borrow().contains(&fold(name));
        if name_rejected || self.rejected_paths.borrow().contains(&normalize_path(path)) {
            return Err(StoreError::Injected {
                root,
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn with_key(&self, root: RegistryRoot, path: &str, update: impl FnOnce(&mut KeyNode)) {
        let normalized = normalize_path(path);
        let mut keys = self.keys.borrow_mut();
        // Intermediate keys are created on demand, like RegCreateKeyEx.
        let mut prefix = String::new();
        for segment in normalized.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(segment);
            keys.entry((root, prefix.clone())).or_default();
        }
        if let Some(node) = keys.get_mut(&(root, normalized)) {
            update(node);
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn write_default_value(
        &self,
        root: RegistryRoot,
        path: &str,
        value: &str,
    ) -> StoreResult<()> {
        self.check_rejected(root, path, "")?;
        self.with_key(root, path, |node| {
            node.default_value = Some(value.to_string());
        });
        self.log.borrow_mut().push(RecordedWrite {
            root,
            write: StoreWrite::DefaultValue {
                path: path.to_string(),
                value: value.to_string(),
            },
        });
        Ok(())
    }

    fn write_named_value(
        &self,
        root: RegistryRoot,
        path: &str,
        name: &str,
        value: &str,
    ) -> StoreResult<()> {
        self.check_rejected(root, path, name)?;
        self.with_key(root, path, |node| {
            node.values
                .entry(fold(name))
                .and_modify(|(_, data)| *data = value.to_string())
                .or_insert_with(|| (name.to_string(), value.to_string()));
        });
        self.log.borrow_mut().push(RecordedWrite {
            root,
            write: StoreWrite::NamedValue {
                path: path.to_string(),
                name: name.to_string(),
                value: value.to_string(),
            },
        });
        Ok(())
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn normalize_path(path: &str) -> String {
    path.trim_matches('\\')
        .split('\\')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::InMemoryStore;
    use crate::store::{KeyValueStore, RegistryRoot, StoreError};

    #[test]
    fn creates_intermediate_keys() {
        let store = InMemoryStore::new();
        store
            .write_named_value(RegistryRoot::CurrentUser, "A\\B\\C", "x", "1")
            .expect("write");

        assert!(store.key_exists(RegistryRoot::CurrentUser, "A"));
        assert!(store.key_exists(RegistryRoot::CurrentUser, "A\\B"));
        assert!(!store.key_exists(RegistryRoot::LocalMachine, "A"));
        assert_eq!(
            store.named_value(RegistryRoot::CurrentUser, "a\\b\\c", "x"),
            Some("1".to_string())
        );
    }

    #[test]
    fn roots_are_isolated() {
        let store = InMemoryStore::new();
        store
            .write_default_value(RegistryRoot::LocalMachine, "Key", "machine")
            .expect("write");

        assert_eq!(store.default_value(RegistryRoot::CurrentUser, "Key"), None);
        assert_eq!(
            store.default_value(RegistryRoot::LocalMachine, "Key"),
            Some("machine".to_string())
        );
    }

    #[test]
    fn injected_failure_is_not_logged() {
        let store = InMemoryStore::new();
        store.fail_writes_to_name("bad");

        let err = store
            .write_named_value(RegistryRoot::CurrentUser, "Key", "bad", "")
            .expect_err("rejected name must fail");
        assert!(matches!(err, StoreError::Injected { .. }));
        assert_eq!(store.write_count(), 0);
        assert!(!store.key_exists(RegistryRoot::CurrentUser, "Key"));

        let err = store
            .write_named_value(RegistryRoot::CurrentUser, "Key", "BAD", "")
            .expect_err("name rejection ignores case");
        assert!(matches!(err, StoreError::Injected { .. }));
    }

    #[test]
    fn value_names_are_case_insensitive_and_keep_first_spelling() {
        let store = InMemoryStore::new();
        let root = RegistryRoot::CurrentUser;
        store
            .write_named_value(root, "Key", "FooApp.1", "first")
            .expect("write");
        store
            .write_named_value(root, "key", "fooapp.1", "second")
            .expect("write");

        assert_eq!(store.value_names(root, "KEY"), vec!["FooApp.1".to_string()]);
        assert_eq!(
            store.named_value(root, "Key", "FOOAPP.1"),
            Some("second".to_string())
        );
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn path_rejection_covers_default_and_named_writes() {
        let store = InMemoryStore::new();
        store.fail_writes_to_path("Software\\Blocked");
        let root = RegistryRoot::LocalMachine;

        let err = store
            .write_default_value(root, "software\\blocked", "x")
            .expect_err("default write must fail");
        match err {
            StoreError::Injected { name, .. } => assert!(name.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store
            .write_named_value(root, "Software\\Blocked", "v", "x")
            .is_err());
        store
            .write_default_value(root, "Software\\Other", "x")
            .expect("other paths still accept writes");
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn clear_log_keeps_stored_values() {
        let store = InMemoryStore::new();
        store
            .write_default_value(RegistryRoot::CurrentUser, "Key", "kept")
            .expect("write");
        store.clear_log();

        assert_eq!(store.write_count(), 0);
        assert!(store.recorded_writes().is_empty());
        assert_eq!(
            store.default_value(RegistryRoot::CurrentUser, "Key"),
            Some("kept".to_string())
        );
    }
}
