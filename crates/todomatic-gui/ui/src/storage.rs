use anyhow::anyhow;
use todomatic_core::{
  KeyValueStore,
  PersistenceMirror,
  TaskList,
  default_tasks
};

/// The browser's `localStorage`, looked up on every access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn browser_storage()
-> anyhow::Result<web_sys::Storage> {
  web_sys::window()
    .ok_or_else(|| anyhow!("no window"))?
    .local_storage()
    .map_err(|err| {
      anyhow!(
        "localStorage denied: {err:?}"
      )
    })?
    .ok_or_else(|| {
      anyhow!(
        "localStorage unavailable"
      )
    })
}

impl KeyValueStore for LocalStorage {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    browser_storage()?
      .get_item(key)
      .map_err(|err| {
        anyhow!(
          "localStorage read failed: \
           {err:?}"
        )
      })
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    browser_storage()?
      .set_item(key, value)
      .map_err(|err| {
        anyhow!(
          "localStorage write failed: \
           {err:?}"
        )
      })
  }
}

pub fn load_tasks() -> TaskList {
  let (tasks, outcome) =
    PersistenceMirror::new(LocalStorage)
      .restore(default_tasks());
  tracing::debug!(
    ?outcome,
    count = tasks.len(),
    "loaded tasks from local storage"
  );
  tasks
}

pub fn save_tasks(tasks: &TaskList) {
  PersistenceMirror::new(LocalStorage)
    .save(tasks);
}
