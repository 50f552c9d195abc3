use std::collections::HashSet;

use todomatic_core::persist::{self, DEFAULT_STORAGE_KEY};
use todomatic_core::{
    Filter, KeyValueStore, MemoryStorage, PersistenceMirror, RestoreOutcome, TaskAction,
    TaskList, TodoSession, default_tasks,
};

#[test]
fn session_roundtrip_and_filtering() {
    let mut storage = MemoryStorage::new();
    let mut session = TodoSession::open(PersistenceMirror::new(&mut storage), TaskList::default());

    let ids: Vec<String> = ["Buy milk", "Walk dog", "Call mum"]
        .iter()
        .map(|name| session.add(name).0)
        .collect();
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);

    session.dispatch(TaskAction::Toggle { id: ids[1].clone() });
    session.dispatch(TaskAction::Edit {
        id: ids[2].clone(),
        name: "Call mom".to_string(),
    });

    session.dispatch(TaskAction::SetFilter(Filter::Active));
    let active: Vec<&str> = session.visible().into_iter().map(|t| t.name.as_str()).collect();
    assert_eq!(active, vec!["Buy milk", "Call mom"]);
    assert_eq!(session.heading_text(), "2 tasks remaining");

    session.dispatch(TaskAction::SetFilter(Filter::Completed));
    assert_eq!(session.heading_text(), "1 task remaining");

    let snapshot = session.store().tasks().clone();
    drop(session);

    let raw = storage
        .get(DEFAULT_STORAGE_KEY)
        .expect("get")
        .expect("persisted");
    assert_eq!(persist::decode(&raw).expect("decode"), snapshot);

    let reopened = TodoSession::open(PersistenceMirror::new(&mut storage), default_tasks());
    assert_eq!(reopened.restored(), RestoreOutcome::Restored);
    assert_eq!(reopened.store().tasks(), &snapshot);
    assert_eq!(reopened.store().filter(), Filter::All);
}

#[test]
fn deleting_one_task_signals_focus_once() {
    let mut session = TodoSession::open(PersistenceMirror::new(MemoryStorage::new()), default_tasks());

    let first = session.dispatch(TaskAction::Delete {
        id: "todo-1".to_string(),
    });
    assert!(first.focus_heading);

    let repeat = session.dispatch(TaskAction::Delete {
        id: "todo-1".to_string(),
    });
    assert!(!repeat.changed);
    assert!(!repeat.focus_heading);
    assert_eq!(session.store().tasks().len(), 2);
}

#[test]
fn garbage_in_storage_restores_defaults() {
    let mut storage = MemoryStorage::new();
    storage
        .set(DEFAULT_STORAGE_KEY, r#"[{"name":"no id","completed":false}]"#)
        .expect("seed");

    let session = TodoSession::open(PersistenceMirror::new(&mut storage), default_tasks());
    assert_eq!(session.restored(), RestoreOutcome::Malformed);
    assert_eq!(session.store().tasks(), &default_tasks());
    drop(session);

    let raw = storage
        .get(DEFAULT_STORAGE_KEY)
        .expect("get")
        .expect("rewritten");
    assert_eq!(persist::decode(&raw).expect("decode"), default_tasks());
}
