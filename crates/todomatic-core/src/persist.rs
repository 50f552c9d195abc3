use anyhow::{Context, anyhow};
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;
use crate::task::TaskList;

pub const DEFAULT_STORAGE_KEY: &str = "savedTasks";

/// How the startup collection was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    Missing,
    Malformed,
    Unreadable,
}

/// Mirrors the task collection into a single key-value slot.
#[derive(Debug)]
pub struct PersistenceMirror<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceMirror<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the persisted collection, falling back to `defaults` when the
    /// slot is empty, unreadable or holds something that is not a task list.
    #[tracing::instrument(skip(self, defaults), fields(key = %self.key))]
    pub fn restore(&self, defaults: TaskList) -> (TaskList, RestoreOutcome) {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted tasks; using defaults");
                return (defaults, RestoreOutcome::Missing);
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed reading persisted tasks; using defaults");
                return (defaults, RestoreOutcome::Unreadable);
            }
        };

        match decode(&raw) {
            Ok(tasks) => {
                info!(count = tasks.len(), "restored persisted tasks");
                (tasks, RestoreOutcome::Restored)
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "discarding malformed persisted tasks");
                (defaults, RestoreOutcome::Malformed)
            }
        }
    }

    /// Best-effort write; failures are logged and reported as `false`.
    #[tracing::instrument(skip(self, tasks), fields(key = %self.key, count = tasks.len()))]
    pub fn save(&mut self, tasks: &TaskList) -> bool {
        let result = encode(tasks).and_then(|json| self.storage.set(&self.key, &json));
        match result {
            Ok(()) => {
                debug!("persisted tasks");
                true
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed persisting tasks");
                false
            }
        }
    }
}

pub fn encode(tasks: &TaskList) -> anyhow::Result<String> {
    serde_json::to_string(tasks).context("failed serializing tasks")
}

pub fn decode(raw: &str) -> anyhow::Result<TaskList> {
    let tasks: TaskList =
        serde_json::from_str(raw).context("persisted value is not a task array")?;
    if !tasks.has_unique_ids() {
        return Err(anyhow!("persisted tasks contain duplicate ids"));
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::task::{Task, default_tasks};

    struct FailingStorage;

    impl KeyValueStore for FailingStorage {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("storage offline"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("quota exceeded"))
        }
    }

    fn sample() -> TaskList {
        TaskList::new(vec![
            Task {
                id: "todo-a".to_string(),
                name: "Buy milk".to_string(),
                completed: true,
            },
            Task::new_active("todo-b".to_string(), "Walk dog".to_string()),
        ])
    }

    #[test]
    fn save_then_restore_yields_an_equal_collection() {
        let mut mirror = PersistenceMirror::new(MemoryStorage::new());
        assert!(mirror.save(&sample()));

        let (restored, outcome) = mirror.restore(TaskList::default());
        assert_eq!(outcome, RestoreOutcome::Restored);
        assert_eq!(restored, sample());
    }

    #[test]
    fn empty_slot_falls_back_to_defaults() {
        let mirror = PersistenceMirror::new(MemoryStorage::new());
        let (restored, outcome) = mirror.restore(default_tasks());

        assert_eq!(outcome, RestoreOutcome::Missing);
        assert_eq!(restored, default_tasks());
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let bad = [
            "not json",
            r#"{"id":"todo-a"}"#,
            r#"[{"id":"todo-a","name":"x"}]"#,
            r#"[{"id":1,"name":"x","completed":false}]"#,
            r#"[{"id":"a","name":"x","completed":false},{"id":"a","name":"y","completed":true}]"#,
        ];

        for raw in bad {
            let mut storage = MemoryStorage::new();
            storage.set(DEFAULT_STORAGE_KEY, raw).expect("seed");
            let mirror = PersistenceMirror::new(storage);

            let (restored, outcome) = mirror.restore(default_tasks());
            assert_eq!(outcome, RestoreOutcome::Malformed, "input: {raw}");
            assert_eq!(restored, default_tasks());
        }
    }

    #[test]
    fn extra_fields_are_ignored() {
        let tasks = decode(r#"[{"id":"a","name":"x","completed":false,"color":"red"}]"#)
            .expect("decode");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "x");
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut mirror = PersistenceMirror::new(FailingStorage);

        assert!(!mirror.save(&sample()));
        let (restored, outcome) = mirror.restore(default_tasks());
        assert_eq!(outcome, RestoreOutcome::Unreadable);
        assert_eq!(restored, default_tasks());
    }

    #[test]
    fn custom_key_is_respected() {
        let mut mirror = PersistenceMirror::with_key(MemoryStorage::new(), "other");
        mirror.save(&sample());

        assert!(mirror.storage().get("other").expect("get").is_some());
        assert!(mirror.storage().get(DEFAULT_STORAGE_KEY).expect("get").is_none());
    }
}
