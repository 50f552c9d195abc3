use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use todomatic_core::{
  DEFAULT_STORAGE_KEY,
  Filter
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

const RC_ENV_VAR: &str = "TODORC";
const RC_FILE_NAME: &str = ".todorc";
const DEFAULT_DATA_DIR: &str =
  ".todomatic";

#[derive(Debug, Clone)]
pub struct Config {
  map:          HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "data.location".to_string(),
      format!("~/{DEFAULT_DATA_DIR}")
    );
    map.insert(
      "storage.key".to_string(),
      DEFAULT_STORAGE_KEY.to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "default.filter".to_string(),
      "all".to_string()
    );
    map.insert(
      "seed.defaults".to_string(),
      "on".to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    match resolve_rc_path(rc_override)?
    {
      | Some(path) => {
        info!(todorc = %path.display(), "loading todorc");
        cfg.load_file(&path)?;
      }
      | None => {
        warn!(
          "no todorc found; using \
           defaults"
        );
      }
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      self.map.insert(key, value);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<&str> {
    self.map.get(key).map(String::as_str)
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .get(key)
      .map(|value| {
        parse_bool(value).ok_or_else(
          || {
            anyhow!(
              "invalid boolean for \
               {key}: {value}"
            )
          }
        )
      })
      .transpose()
  }

  pub fn storage_key(&self) -> &str {
    self
      .get("storage.key")
      .filter(|key| {
        !key.trim().is_empty()
      })
      .unwrap_or(DEFAULT_STORAGE_KEY)
  }

  pub fn color(
    &self
  ) -> anyhow::Result<bool> {
    Ok(
      self
        .get_bool("color")?
        .unwrap_or(true)
    )
  }

  pub fn seed_defaults(
    &self
  ) -> anyhow::Result<bool> {
    Ok(
      self
        .get_bool("seed.defaults")?
        .unwrap_or(true)
    )
  }

  pub fn default_filter(
    &self
  ) -> anyhow::Result<Filter> {
    match self.get("default.filter") {
      | Some(raw) => {
        raw.parse::<Filter>().context(
          "invalid default.filter"
        )
      }
      | None => Ok(Filter::All)
    }
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line =
        strip_comment(raw_line).trim();

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        if self
          .loaded_files
          .contains(&include_path)
        {
          warn!(include = %include_path.display(), "include already loaded; skipping");
          continue;
        }

        debug!(
          file = %path.display(),
          include = %include_path.display(),
          line = line_num + 1,
          "processing include"
        );
        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = match override_dir {
    | Some(path) => path.to_path_buf(),
    | None => {
      match cfg.get("data.location") {
        | Some(value) => {
          expand_tilde(Path::new(value))
        }
        | None => {
          home_dir()?
            .join(DEFAULT_DATA_DIR)
        }
      }
    }
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(from_env) =
    std::env::var(RC_ENV_VAR)
  {
    if from_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      from_env
    )));
  }

  let candidate =
    home_dir()?.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn home_dir() -> anyhow::Result<PathBuf>
{
  dirs::home_dir().ok_or_else(|| {
    anyhow!(
      "cannot determine home \
       directory"
    )
  })
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let expanded =
    expand_tilde(Path::new(include));
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

/// Cuts a `#` comment that starts the
/// line or follows whitespace; a `#`
/// inside a value is kept.
fn strip_comment(line: &str) -> &str {
  let mut prev_blank = true;
  for (idx, ch) in line.char_indices() {
    if ch == '#' && prev_blank {
      return &line[..idx];
    }
    prev_blank = ch.is_whitespace();
  }
  line
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_rc(
    dir: &Path,
    name: &str,
    body: &str
  ) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body)
      .expect("write rc");
    path
  }

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = Config::default();

    assert_eq!(
      cfg.storage_key(),
      "savedTasks"
    );
    assert!(cfg.color().expect("color"));
    assert!(
      cfg
        .seed_defaults()
        .expect("seed")
    );
    assert_eq!(
      cfg
        .default_filter()
        .expect("filter"),
      Filter::All
    );
  }

  #[test]
  fn loads_keys_comments_and_includes()
  {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    write_rc(
      temp.path(),
      "extra.rc",
      "default.filter = active\n"
    );
    let main = write_rc(
      temp.path(),
      "main.rc",
      "# todo settings\ncolor = off  \
       # plain output\nstorage.key=\
       myTasks\ninclude extra.rc\n"
    );

    let cfg = Config::load(Some(&main))
      .expect("load");

    assert_eq!(cfg.loaded_files.len(), 2);
    assert!(!cfg.color().expect("color"));
    assert_eq!(
      cfg.storage_key(),
      "myTasks"
    );
    assert_eq!(
      cfg
        .default_filter()
        .expect("filter"),
      Filter::Active
    );
  }

  #[test]
  fn hash_inside_a_value_is_kept() {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    let rc = write_rc(
      temp.path(),
      "hash.rc",
      "storage.key = a#b # trailing\n\
       #color = off\n"
    );

    let cfg = Config::load(Some(&rc))
      .expect("load");

    assert_eq!(cfg.storage_key(), "a#b");
    assert!(cfg.color().expect("color"));
    assert_eq!(
      strip_comment("x = 1\t# note"),
      "x = 1\t"
    );
  }

  #[test]
  fn overrides_win_and_bad_values_error()
  {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
      (
        "seed.defaults".to_string(),
        "maybe".to_string()
      ),
      (
        "default.filter".to_string(),
        "done".to_string()
      ),
    ]);

    assert!(cfg.seed_defaults().is_err());
    assert!(
      cfg.default_filter().is_err()
    );
  }

  #[test]
  fn malformed_line_is_reported() {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    let rc = write_rc(
      temp.path(),
      "bad.rc",
      "color on\n"
    );

    let err = Config::load(Some(&rc))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }
}
