use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub site: SiteConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
  /// Origin the portfolio is published at, e.g. https://me.example
  pub origin: String,
  /// Custom title for the header (defaults to the origin if not set)
  pub title: Option<String>,
  /// Path of the project feed relative to the origin
  #[serde(default = "default_data_path")]
  pub data_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Serve everything from cache; never touch the network
  #[serde(default)]
  pub offline: bool,
  /// Versioned cache name. Bumping the version orphans old partitions;
  /// they are deleted on activation.
  #[serde(default = "default_cache_name")]
  pub name: String,
  /// Override the directory holding the cache database
  pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      offline: false,
      name: default_cache_name(),
      dir: None,
    }
  }
}

fn default_data_path() -> String {
  "/data/projects.json".to_string()
}

fn default_cache_name() -> String {
  "folio-v1".to_string()
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
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
        "No configuration file found. Create one at ~/.config/folio/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Header title: the configured one, or the site origin.
  pub fn display_title(&self) -> &str {
    self.site.title.as_deref().unwrap_or(&self.site.origin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_gets_defaults() {
    let config: Config = serde_yaml::from_str(
      "site:\n  origin: https://me.example\n",
    )
    .unwrap();

    assert_eq!(config.site.origin, "https://me.example");
    assert_eq!(config.site.data_path, "/data/projects.json");
    assert!(config.cache.enabled);
    assert!(!config.cache.offline);
    assert_eq!(config.cache.name, "folio-v1");
    assert_eq!(config.display_title(), "https://me.example");
  }

  #[test]
  fn test_full_config() {
    let config: Config = serde_yaml::from_str(
      "site:\n  origin: https://me.example\n  title: My Vault\n  data_path: /feed/all.json\ncache:\n  enabled: false\n  name: folio-v2\n",
    )
    .unwrap();

    assert_eq!(config.display_title(), "My Vault");
    assert_eq!(config.site.data_path, "/feed/all.json");
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.name, "folio-v2");
  }
}
