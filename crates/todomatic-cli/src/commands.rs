use std::io::{BufRead, Write};

use anyhow::anyhow;
use todomatic_core::{Commit, Filter, KeyValueStore, TaskAction, TaskStore, TodoSession};
use tracing::{debug, info, instrument, warn};

use crate::cli::{Command, EditArgs, ListArgs, NameArgs, RefArgs};
use crate::render::Renderer;

const SHELL_HELP: &str = "\
commands:
  add <name>          append a task
  toggle <task>       flip completed
  edit <task> <name>  rename a task
  delete <task>       remove a task
  filter <name>       all | active | completed
  list                show the list
  help                this text
  quit                leave the shell
<task> is a list position, an id, or a unique id prefix";

/// Maps a user-supplied task reference onto an id.
///
/// An exact id wins, then a 1-based position over the visible list, then
/// a prefix that matches exactly one id. Blank tokens match nothing.
pub fn resolve_task_ref(store: &TaskStore, token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(task) = store.get(token) {
        return Some(task.id.clone());
    }

    if let Ok(pos) = token.parse::<usize>() {
        return pos
            .checked_sub(1)
            .and_then(|idx| store.visible().get(idx).map(|task| task.id.clone()));
    }

    let mut matches = store
        .tasks()
        .iter()
        .filter(|task| task.id.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        debug!(token, "ambiguous id prefix");
        None
    } else {
        Some(first.id.clone())
    }
}

fn task_name(words: &[String]) -> anyhow::Result<String> {
    let name = words.join(" ").trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("task name cannot be empty"));
    }
    Ok(name)
}

#[instrument(skip(session, renderer))]
pub fn execute<S, W>(
    session: &mut TodoSession<S>,
    renderer: &mut Renderer<W>,
    command: Command,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let commit = match command {
        Command::List(ListArgs { filter }) => {
            if let Some(filter) = filter {
                session.dispatch(TaskAction::SetFilter(filter));
            }
            None
        }
        Command::Add(NameArgs { name }) => {
            let name = task_name(&name)?;
            let (id, commit) = session.add(&name);
            info!(id = %id, "task added from cli");
            Some(commit)
        }
        Command::Toggle(RefArgs { task }) => {
            let id = lookup(session, renderer, &task)?;
            Some(session.dispatch(TaskAction::Toggle { id }))
        }
        Command::Edit(EditArgs { task, name }) => {
            let name = task_name(&name)?;
            let id = lookup(session, renderer, &task)?;
            Some(session.dispatch(TaskAction::Edit { id, name }))
        }
        Command::Delete(RefArgs { task }) => {
            let id = lookup(session, renderer, &task)?;
            Some(session.dispatch(TaskAction::Delete { id }))
        }
        Command::Shell => {
            return Err(anyhow!("the shell cannot be nested"));
        }
    };

    show(session, renderer, commit)
}

fn lookup<S, W>(
    session: &TodoSession<S>,
    renderer: &mut Renderer<W>,
    token: &str,
) -> anyhow::Result<String>
where
    S: KeyValueStore,
    W: Write,
{
    match resolve_task_ref(session.store(), token) {
        Some(id) => Ok(id),
        None => {
            warn!(token, "task reference matched nothing");
            renderer.notice(&format!("no task matches '{token}'"))?;
            Ok(token.to_string())
        }
    }
}

fn show<S, W>(
    session: &TodoSession<S>,
    renderer: &mut Renderer<W>,
    commit: Option<Commit>,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let heading = session.heading_text();
    renderer.print_list(session.store().filter(), &session.visible(), &heading)?;
    if commit.is_some_and(|commit| commit.focus_heading) {
        renderer.announce(&heading)?;
    }
    Ok(())
}

/// Parses one shell line. `Ok(None)` means "nothing to run".
pub fn parse_shell_line(line: &str) -> anyhow::Result<Option<ShellInput>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let words = || vec![rest.to_string()];

    let input = match verb.to_ascii_lowercase().as_str() {
        "add" => ShellInput::Run(Command::Add(NameArgs { name: words() })),
        "toggle" | "done" => ShellInput::Run(Command::Toggle(RefArgs {
            task: required(rest, "toggle <task>")?,
        })),
        "delete" | "rm" => ShellInput::Run(Command::Delete(RefArgs {
            task: required(rest, "delete <task>")?,
        })),
        "edit" => {
            let (task, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: edit <task> <name>"))?;
            ShellInput::Run(Command::Edit(EditArgs {
                task: task.to_string(),
                name: vec![name.to_string()],
            }))
        }
        "filter" => ShellInput::Run(Command::List(ListArgs {
            filter: Some(required(rest, "filter <name>")?.parse::<Filter>()?),
        })),
        "list" | "ls" => ShellInput::Run(Command::List(ListArgs::default())),
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        other => return Err(anyhow!("unknown command: {other} (try 'help')")),
    };

    Ok(Some(input))
}

fn required(rest: &str, usage: &str) -> anyhow::Result<String> {
    if rest.is_empty() {
        Err(anyhow!("usage: {usage}"))
    } else {
        Ok(rest.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Run(Command),
    Help,
    Quit,
}

/// Runs commands read from `input` against one session until EOF or
/// `quit`. Bad lines are reported and skipped.
#[instrument(skip_all)]
pub fn run_shell<S, R, W>(
    session: &mut TodoSession<S>,
    renderer: &mut Renderer<W>,
    input: R,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    show(session, renderer, None)?;

    for line in input.lines() {
        let line = line?;
        let outcome = parse_shell_line(&line).and_then(|parsed| match parsed {
            None => Ok(true),
            Some(ShellInput::Quit) => Ok(false),
            Some(ShellInput::Help) => renderer.notice(SHELL_HELP).map(|()| true),
            Some(ShellInput::Run(command)) => {
                execute(session, renderer, command).map(|()| true)
            }
        });

        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => renderer.notice(&format!("error: {err:#}"))?,
        }
    }

    info!("shell closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use todomatic_core::{MemoryStorage, PersistenceMirror, Task, TaskList, default_tasks};

    use super::*;

    fn session() -> TodoSession<MemoryStorage> {
        TodoSession::open(PersistenceMirror::new(MemoryStorage::new()), default_tasks())
    }

    #[test]
    fn resolves_positions_ids_and_prefixes() {
        let mut session = session();
        session.dispatch(TaskAction::SetFilter(Filter::Active));
        let store = session.store();

        assert_eq!(resolve_task_ref(store, "1").as_deref(), Some("todo-1"));
        assert_eq!(resolve_task_ref(store, "2").as_deref(), Some("todo-2"));
        assert_eq!(resolve_task_ref(store, "3"), None);
        assert_eq!(resolve_task_ref(store, "0"), None);
        assert_eq!(resolve_task_ref(store, "todo-0").as_deref(), Some("todo-0"));
        assert_eq!(resolve_task_ref(store, "todo-"), None);
        assert_eq!(resolve_task_ref(store, "nope"), None);
    }

    #[test]
    fn blank_reference_matches_nothing() {
        let mut session =
            TodoSession::open(PersistenceMirror::new(MemoryStorage::new()), TaskList::default());
        let (id, _) = session.add("Only task");
        let mut renderer = Renderer::new(Vec::new(), false);

        assert_eq!(resolve_task_ref(session.store(), ""), None);
        assert_eq!(resolve_task_ref(session.store(), "  "), None);
        assert_eq!(resolve_task_ref(session.store(), "todo").as_deref(), Some(id.as_str()));

        execute(
            &mut session,
            &mut renderer,
            Command::Delete(RefArgs {
                task: " ".to_string(),
            }),
        )
        .expect("blank delete");
        assert_eq!(session.store().tasks().len(), 1);
    }

    #[test]
    fn exact_id_beats_position() {
        let tasks = TaskList::new(vec![
            Task::new_active("2".to_string(), "first".to_string()),
            Task::new_active("1".to_string(), "second".to_string()),
        ]);
        let store = TaskStore::new(tasks);

        assert_eq!(resolve_task_ref(&store, "1").as_deref(), Some("1"));
        assert_eq!(resolve_task_ref(&store, "2").as_deref(), Some("2"));
        assert_eq!(resolve_task_ref(&store, "  1 ").as_deref(), Some("1"));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut session = session();
        let mut renderer = Renderer::new(Vec::new(), false);

        let err = execute(
            &mut session,
            &mut renderer,
            Command::Add(NameArgs {
                name: vec!["   ".to_string()],
            }),
        )
        .expect_err("empty name");
        assert!(err.to_string().contains("empty"));
        assert_eq!(session.store().tasks().len(), 3);
    }

    #[test]
    fn unknown_reference_is_reported_but_harmless() {
        let mut session = session();
        let mut renderer = Renderer::new(Vec::new(), false);

        execute(
            &mut session,
            &mut renderer,
            Command::Delete(RefArgs {
                task: "todo-zzz".to_string(),
            }),
        )
        .expect("no-op delete");

        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(text.starts_with("no task matches 'todo-zzz'"));
        assert_eq!(session.store().tasks().len(), 3);
    }

    #[test]
    fn parses_shell_lines() {
        assert_eq!(parse_shell_line("   ").expect("parse"), None);
        assert_eq!(
            parse_shell_line("edit 2 Read a book").expect("parse"),
            Some(ShellInput::Run(Command::Edit(EditArgs {
                task: "2".to_string(),
                name: vec!["Read a book".to_string()],
            })))
        );
        assert_eq!(
            parse_shell_line("QUIT").expect("parse"),
            Some(ShellInput::Quit)
        );
        assert!(parse_shell_line("toggle").is_err());
        assert!(parse_shell_line("filter done").is_err());
        assert!(parse_shell_line("fly away").is_err());
    }

    #[test]
    fn shell_announces_heading_after_delete() {
        let mut session = session();
        let mut renderer = Renderer::new(Vec::new(), false);
        let script = "add Buy milk\nfilter active\ndelete 3\nbogus\nquit\nadd never\n";

        run_shell(&mut session, &mut renderer, script.as_bytes()).expect("shell");

        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(text.contains("> 2 tasks remaining"));
        assert!(text.contains("error: unknown command: bogus"));
        let names: Vec<&str> = session
            .store()
            .tasks()
            .iter()
            .map(|task| task.name.as_str())
            .collect();
        assert_eq!(names, vec!["Eat", "Sleep", "Repeat"]);
    }
}
