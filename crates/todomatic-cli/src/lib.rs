pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod render;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use todomatic_core::{PersistenceMirror, RestoreOutcome, TaskList, TodoSession, default_tasks};
use tracing::{debug, info, warn};

use crate::cli::{Command, GlobalCli, ListArgs};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting todo CLI"
    );

    let mut cfg = config::Config::load(cli.todorc.as_deref())?;
    cfg.apply_overrides(
        cli.rc_overrides
            .into_iter()
            .map(|kv| (kv.key, kv.value)),
    );

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let storage = datastore::FileStorage::open(&data_dir)
        .with_context(|| format!("failed to open storage at {}", data_dir.display()))?;

    let defaults = if cfg.seed_defaults()? {
        default_tasks()
    } else {
        TaskList::default()
    };

    let mirror = PersistenceMirror::with_key(storage, cfg.storage_key());
    let mut session = TodoSession::open(mirror, defaults).with_filter(cfg.default_filter()?);
    if session.restored() == RestoreOutcome::Malformed {
        warn!("stored task list was unreadable and has been reset");
    }

    let mut renderer = render::Renderer::stdout(&cfg)?;
    let command = cli
        .command
        .unwrap_or_else(|| Command::List(ListArgs::default()));
    debug!(?command, "dispatching");

    match command {
        Command::Shell => {
            commands::run_shell(&mut session, &mut renderer, io::stdin().lock())?;
        }
        other => commands::execute(&mut session, &mut renderer, other)?,
    }

    info!("done");
    Ok(())
}
