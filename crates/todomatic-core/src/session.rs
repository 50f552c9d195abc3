use tracing::{debug, info};

use crate::filter::Filter;
use crate::focus::FocusController;
use crate::persist::{PersistenceMirror, RestoreOutcome};
use crate::storage::KeyValueStore;
use crate::store::{TaskAction, TaskStore};
use crate::task::{Task, TaskList};

/// What a single dispatched action did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commit {
    pub changed: bool,
    pub persisted: bool,
    pub focus_heading: bool,
}

/// Store, mirror and focus tracking wired into one commit pipeline:
/// mutate, persist, re-derive, then check focus.
#[derive(Debug)]
pub struct TodoSession<S> {
    store: TaskStore,
    mirror: PersistenceMirror<S>,
    focus: FocusController,
    restored: RestoreOutcome,
}

impl<S: KeyValueStore> TodoSession<S> {
    #[tracing::instrument(skip_all, fields(key = %mirror.key()))]
    pub fn open(mut mirror: PersistenceMirror<S>, defaults: TaskList) -> Self {
        let (tasks, restored) = mirror.restore(defaults);
        mirror.save(&tasks);

        let mut focus = FocusController::new();
        focus.observe(tasks.len());

        info!(count = tasks.len(), ?restored, "opened todo session");
        Self {
            store: TaskStore::new(tasks),
            mirror,
            focus,
            restored,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.store.set_filter(filter);
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn mirror(&self) -> &PersistenceMirror<S> {
        &self.mirror
    }

    pub fn restored(&self) -> RestoreOutcome {
        self.restored
    }

    pub fn visible(&self) -> Vec<&Task> {
        self.store.visible()
    }

    pub fn heading_text(&self) -> String {
        self.store.heading_text()
    }

    #[tracing::instrument(skip(self))]
    pub fn dispatch(&mut self, action: TaskAction) -> Commit {
        self.commit(|store| store.apply(action)).1
    }

    /// Adds a task and returns its id along with the commit.
    pub fn add(&mut self, name: &str) -> (String, Commit) {
        self.commit(|store| store.add_task(name))
    }

    fn commit<T, F>(&mut self, mutate: F) -> (T, Commit)
    where
        F: FnOnce(&mut TaskStore) -> T,
    {
        let before = self.store.tasks().clone();
        let output = mutate(&mut self.store);

        let changed = !self.store.tasks().same_snapshot(&before);
        let persisted = changed && self.mirror.save(self.store.tasks());
        let focus_heading = self.focus.observe(self.store.tasks().len());

        debug!(changed, persisted, focus_heading, "committed action");
        (
            output,
            Commit {
                changed,
                persisted,
                focus_heading,
            },
        )
    }
}
