use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::content::{Language, DEFAULT_USER};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Content language requested from the API (cached snapshots are whatever
  /// language was active when they were primed)
  #[serde(default)]
  pub language: Language,
  /// Bookmark owner; the server has no accounts, just this partition key
  #[serde(default = "default_user")]
  pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  pub url: String,
}

fn default_user() -> String {
  DEFAULT_USER.to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./catechist.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/catechist/config.yaml
  /// 4. ~/.config/catechist/config.yaml
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
        "No configuration file found. Create one at ~/.config/catechist/config.yaml\n\
                 or pass the API address with --url."
      )),
    }
  }

  /// Minimal configuration for when only the API address is known.
  pub fn with_url(url: String) -> Self {
    Self {
      api: ApiConfig { url },
      language: Language::default(),
      user: default_user(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("catechist.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("catechist").join("config.yaml");
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
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn parses_a_full_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      "api:\n  url: http://localhost:5000\nlanguage: cebuano\nuser: demo"
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.api.url, "http://localhost:5000");
    assert_eq!(config.language, Language::Cebuano);
    assert_eq!(config.user, "demo");
  }

  #[test]
  fn language_and_user_default_when_omitted() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "api:\n  url: http://localhost:5000").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.language, Language::English);
    assert_eq!(config.user, DEFAULT_USER);
  }

  #[test]
  fn missing_explicit_path_is_an_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/catechist.yaml"))).is_err());
  }
}
