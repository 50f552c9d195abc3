use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub completed: bool,
}

impl Task {
    pub fn new_active(id: String, name: String) -> Self {
        Self {
            id,
            name,
            completed: false,
        }
    }
}

/// Ordered, immutable snapshot of every task.
///
/// Mutating helpers return a fresh list and leave `self` untouched; when the
/// target id is absent they hand back a clone that shares the same
/// allocation, so [`TaskList::same_snapshot`] tells callers whether anything
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Arc<[Task]>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: tasks.into(),
        }
    }

    pub fn same_snapshot(&self, other: &TaskList) -> bool {
        Arc::ptr_eq(&self.tasks, &other.tasks)
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.tasks.len());
        self.tasks.iter().all(|task| seen.insert(task.id.as_str()))
    }

    pub fn with_appended(&self, task: Task) -> Self {
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.extend(self.tasks.iter().cloned());
        tasks.push(task);
        Self::new(tasks)
    }

    pub fn with_updated<F>(&self, id: &str, update: F) -> Self
    where
        F: FnOnce(&mut Task),
    {
        let Some(idx) = self.position(id) else {
            return self.clone();
        };

        let mut tasks = self.tasks.to_vec();
        update(&mut tasks[idx]);
        Self::new(tasks)
    }

    pub fn without(&self, id: &str) -> Self {
        if self.position(id).is_none() {
            return self.clone();
        }

        Self::new(
            self.tasks
                .iter()
                .filter(|task| task.id != id)
                .cloned()
                .collect(),
        )
    }
}

impl Deref for TaskList {
    type Target = [Task];

    fn deref(&self) -> &Self::Target {
        &self.tasks
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}

impl Serialize for TaskList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.tasks.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Task>::deserialize(deserializer).map(Self::new)
    }
}

/// The list a fresh install starts with.
pub fn default_tasks() -> TaskList {
    TaskList::new(vec![
        Task {
            id: "todo-0".to_string(),
            name: "Eat".to_string(),
            completed: true,
        },
        Task::new_active("todo-1".to_string(), "Sleep".to_string()),
        Task::new_active("todo-2".to_string(), "Repeat".to_string()),
    ])
}
