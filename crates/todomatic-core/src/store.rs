use tracing::{debug, info};

use crate::filter::Filter;
use crate::id::IdGenerator;
use crate::task::{Task, TaskList};

/// One user intent against the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Add { name: String },
    Toggle { id: String },
    Edit { id: String, name: String },
    Delete { id: String },
    SetFilter(Filter),
}

/// Owner of the task collection and the active filter.
///
/// Every mutation swaps in a new [`TaskList`]; ids that match nothing are
/// ignored without error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: TaskList,
    filter: Filter,
    ids: IdGenerator,
}

impl TaskStore {
    pub fn new(tasks: TaskList) -> Self {
        Self {
            tasks,
            filter: Filter::default(),
            ids: IdGenerator,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.find(id)
    }

    /// Tasks passing the active filter, recomputed on each call.
    pub fn visible(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks).collect()
    }

    pub fn heading_text(&self) -> String {
        heading_text(self.visible().len())
    }

    #[tracing::instrument(skip(self), fields(count = self.tasks.len()))]
    pub fn add_task(&mut self, name: &str) -> String {
        let id = self.ids.next_id();
        self.tasks = self
            .tasks
            .with_appended(Task::new_active(id.clone(), name.to_string()));
        info!(id = %id, "added task");
        id
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_task_completed(&mut self, id: &str) {
        let next = self
            .tasks
            .with_updated(id, |task| task.completed = !task.completed);
        self.replace(next, "toggle");
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_task(&mut self, id: &str) {
        let next = self.tasks.without(id);
        self.replace(next, "delete");
    }

    #[tracing::instrument(skip(self, new_name))]
    pub fn edit_task(&mut self, id: &str, new_name: &str) {
        let next = self
            .tasks
            .with_updated(id, |task| task.name = new_name.to_string());
        self.replace(next, "edit");
    }

    pub fn set_filter(&mut self, filter: Filter) {
        debug!(from = %self.filter, to = %filter, "switching filter");
        self.filter = filter;
    }

    pub fn apply(&mut self, action: TaskAction) {
        match action {
            TaskAction::Add { name } => {
                self.add_task(&name);
            }
            TaskAction::Toggle { id } => self.toggle_task_completed(&id),
            TaskAction::Edit { id, name } => self.edit_task(&id, &name),
            TaskAction::Delete { id } => self.delete_task(&id),
            TaskAction::SetFilter(filter) => self.set_filter(filter),
        }
    }

    fn replace(&mut self, next: TaskList, op: &'static str) {
        if next.same_snapshot(&self.tasks) {
            debug!(op, "no task matched; nothing to do");
            return;
        }
        self.tasks = next;
    }
}

pub fn heading_text(remaining: usize) -> String {
    let noun = if remaining == 1 { "task" } else { "tasks" };
    format!("{remaining} {noun} remaining")
}
