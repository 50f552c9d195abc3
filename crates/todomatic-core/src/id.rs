use uuid::Uuid;

pub const TASK_ID_PREFIX: &str = "todo-";

/// Hands out task ids of the form `todo-<random hex>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn next_id(&self) -> String {
        format!("{TASK_ID_PREFIX}{}", Uuid::new_v4().simple())
    }
}
