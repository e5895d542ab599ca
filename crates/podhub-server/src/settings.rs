//! Server configuration, read from a TOML file overlaid by `PODHUB_*`
//! environment variables.

use std::path::{Path, PathBuf};

use podhub_api::ApiConfig;
use serde::Deserialize;

/// Deserialised `config.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub session_ttl_hours:  i64,
  pub max_upload_bytes:   usize,
  pub category_image_dir: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let api = ApiConfig::default();
    Self {
      host:               "127.0.0.1".to_string(),
      port:               5000,
      store_path:         PathBuf::from("~/.local/share/podhub/podhub.db"),
      session_ttl_hours:  api.session_ttl.num_hours(),
      max_upload_bytes:   api.max_upload_bytes,
      category_image_dir: api.category_image_dir,
    }
  }
}

impl ServerConfig {
  /// Layer `path` (if it exists) and the environment over the defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PODHUB"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      session_ttl:        chrono::Duration::hours(self.session_ttl_hours),
      max_upload_bytes:   self.max_upload_bytes,
      category_image_dir: expand_tilde(&self.category_image_dir),
    }
  }
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
