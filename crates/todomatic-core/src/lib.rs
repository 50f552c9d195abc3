pub mod filter;
pub mod focus;
pub mod id;
pub mod persist;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;

pub use filter::Filter;
pub use focus::FocusController;
pub use persist::{DEFAULT_STORAGE_KEY, PersistenceMirror, RestoreOutcome};
pub use session::{Commit, TodoSession};
pub use storage::{KeyValueStore, MemoryStorage};
pub use store::{TaskAction, TaskStore, heading_text};
pub use task::{Task, TaskList, default_tasks};
