//! Runtime settings, layered from an optional TOML file and `HELPDESK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "HELPDESK";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path:     PathBuf,
  /// Ask before deleting a single ticket.
  pub confirm_delete: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:     PathBuf::from("helpdesk.db"),
      confirm_delete: true,
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then overlay the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
  }

  pub fn load_with(path: &Path, env: Environment) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  /// The store path with `~/` resolved against `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
