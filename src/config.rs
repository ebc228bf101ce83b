use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::ModePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  /// How repositories pick between backend and local mirror
  #[serde(default)]
  pub mode_policy: ModePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Project URL, e.g. https://project.supabase.co
  pub url: String,
  /// Schema the tables live in; also used to recognize missing-table errors
  #[serde(default = "default_schema")]
  pub schema: String,
  /// Per-request timeout. Unset means wait indefinitely.
  pub timeout_secs: Option<u64>,
}

fn default_schema() -> String {
  "public".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// Local mirror database (default: $XDG_DATA_HOME/pawhome/cache.db)
  pub path: Option<PathBuf>,
  /// Reseed a collection the user emptied, instead of keeping it empty
  #[serde(default)]
  pub reseed_empty: bool,
}

impl BackendConfig {
  /// Schema-qualified table name, as the backend quotes it in errors.
  pub fn qualified(&self, table: &str) -> String {
    format!("{}.{}", self.schema, table)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./pawhome.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/pawhome/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create ./pawhome.yaml or ~/.config/pawhome/config.yaml\n\
                 with at least `backend: {{ url: https://<project>.supabase.co }}`."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("pawhome.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("pawhome").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the backend API key from environment variables.
  ///
  /// Checks PAWHOME_SUPABASE_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("PAWHOME_SUPABASE_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!("Backend API key not found. Set PAWHOME_SUPABASE_KEY or SUPABASE_ANON_KEY environment variable.")
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("backend:\n  url: https://demo.supabase.co\n").unwrap();
    assert_eq!(config.backend.schema, "public");
    assert_eq!(config.backend.timeout_secs, None);
    assert_eq!(config.mode_policy, ModePolicy::Sticky);
    assert!(!config.storage.reseed_empty);
    assert_eq!(config.backend.qualified("pets"), "public.pets");
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
backend:
  url: http://localhost:54321
  schema: shelter
  timeout_secs: 5
storage:
  path: /tmp/pawhome.db
  reseed_empty: true
mode_policy: probe
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.backend.timeout_secs, Some(5));
    assert_eq!(config.backend.qualified("adoption_requests"), "shelter.adoption_requests");
    assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/pawhome.db")));
    assert!(config.storage.reseed_empty);
    assert_eq!(config.mode_policy, ModePolicy::Probe);
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pawhome.yaml");
    std::fs::write(&path, "backend:\n  url: https://demo.supabase.co\n").unwrap();
    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.backend.url, "https://demo.supabase.co");
  }
}
