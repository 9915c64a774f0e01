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
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const RC_ENV: &str = "DAYBOOKRC";
pub const RC_FILE_NAME: &str =
  ".daybookrc";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "backend.timeout".to_string(),
      "10000".to_string()
    );
    map.insert(
      "form.priority".to_string(),
      "5".to_string()
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

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading daybookrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no daybookrc found; using \
         defaults"
      );
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
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_u64(
    &self,
    key: &str
  ) -> anyhow::Result<Option<u64>> {
    self
      .map
      .get(key)
      .map(|v| {
        v.trim().parse::<u64>().with_context(
          || {
            format!(
              "config key {key} expects \
               a whole number, got {v}"
            )
          }
        )
      })
      .transpose()
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let raw_path = expand_tilde(path);
    let path = fs::canonicalize(
      &raw_path
    )
    .with_context(|| {
      format!(
        "failed to read {}",
        raw_path.display()
      )
    })?;
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
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

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
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if !include_path.exists() {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
          continue;
        }

        let include_path =
          fs::canonicalize(&include_path)
            .with_context(|| {
              format!(
                "failed to resolve include \
                 {}",
                include_path.display()
              )
            })?;
        if self
          .loaded_files
          .contains(&include_path)
        {
          warn!(include = %include_path.display(), "include cycle detected; skipping");
        } else {
          self
            .load_file(&include_path)?;
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
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    debug!(
      "cannot determine home \
       directory; skipping rc lookup"
    );
    return Ok(None);
  };
  let candidate =
    home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
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

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use tempfile::tempdir;

  use super::*;
  use crate::store::StoreOptions;
  use crate::task::Priority;

  #[test]
  fn rc_file_values_and_includes_are_loaded()
  {
    let dir = tempdir().expect("tempdir");
    let extra = dir.path().join("extra.rc");
    fs::write(
      &extra,
      "form.priority = 2\n"
    )
    .expect("write include");

    let main = dir.path().join("main.rc");
    fs::write(
      &main,
      "# daybook settings\n\
       backend.timeout = 2500  # ms\n\
       \n\
       include extra.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&main))
      .expect("load config");

    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.get_u64("backend.timeout")
        .expect("number"),
      Some(2500)
    );

    let options =
      StoreOptions::from_config(&cfg)
        .expect("options");
    assert_eq!(
      options.call_timeout,
      Duration::from_millis(2500)
    );
    assert_eq!(
      options.default_priority,
      Priority::new(2).expect("valid")
    );
  }

  #[test]
  fn self_include_through_parent_dir_is_skipped()
  {
    let dir = tempdir().expect("tempdir");
    let nested = dir.path().join("x");
    fs::create_dir(&nested)
      .expect("create dir");
    let main = nested.join("main.rc");
    fs::write(
      &main,
      "form.priority = 1\n\
       include ../x/main.rc\n\
       include ./main.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&main))
      .expect("load config");

    assert_eq!(cfg.loaded_files.len(), 1);
    assert_eq!(
      cfg.get("form.priority").as_deref(),
      Some("1")
    );
  }

  #[test]
  fn mutual_includes_load_each_file_once()
  {
    let dir = tempdir().expect("tempdir");
    let a = dir.path().join("a.rc");
    let b = dir.path().join("b.rc");
    fs::write(
      &a,
      "backend.timeout = 700\n\
       include b.rc\n"
    )
    .expect("write a");
    fs::write(
      &b,
      "form.priority = 3\n\
       include a.rc\n"
    )
    .expect("write b");

    let cfg = Config::load(Some(&a))
      .expect("load config");

    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.get("form.priority").as_deref(),
      Some("3")
    );
  }

  #[test]
  fn missing_rc_file_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let err = Config::load(Some(
      &dir.path().join("absent.rc")
    ))
    .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("failed to read")
    );
  }

  #[test]
  fn malformed_line_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let main = dir.path().join("bad.rc");
    fs::write(&main, "just words\n")
      .expect("write rc");

    let err = Config::load(Some(&main))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }

  #[test]
  fn overrides_strip_rc_prefix_and_are_validated()
  {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
      "rc.form.priority".to_string(),
      "9".to_string()
    )]);
    assert_eq!(
      cfg.get("form.priority").as_deref(),
      Some("9")
    );
    assert!(
      StoreOptions::from_config(&cfg)
        .is_err()
    );

    cfg.apply_overrides(vec![(
      "backend.timeout".to_string(),
      "soon".to_string()
    )]);
    assert!(
      cfg.get_u64("backend.timeout")
        .is_err()
    );
  }

  #[test]
  fn zero_timeout_is_rejected() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
      "backend.timeout".to_string(),
      "0".to_string()
    )]);
    assert!(
      StoreOptions::from_config(&cfg)
        .is_err()
    );
  }
}
