//! Project configuration loader for describing a bundle build.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::resolve::ResolveOptions;

/// File name searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "modpack.config.json";

/// Discoverable build configuration. Every field is optional in the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundlerConfig {
  /// Entry module of the bundle.
  pub entry: Option<PathBuf>,
  /// Where the bundle is written; standard output when unset.
  pub output: Option<PathBuf>,
  /// Where the JSON build manifest is written; skipped when unset.
  pub manifest: Option<PathBuf>,
  /// Specifier resolution policy.
  pub resolve: ResolveOptions,
}

/// Errors that can occur while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration file.
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
}

impl BundlerConfig {
  /// Load `modpack.config.json` from `dir`, falling back to defaults when it does not exist.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
        Ok(Self::default())
      }
      other => other,
    }
  }

  /// Read configuration from a specific JSON file.
  ///
  /// Relative paths inside the file are taken relative to the directory containing it.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.relative_to(base))
  }

  fn relative_to(self, base: &Path) -> Self {
    let anchor = |path: Option<PathBuf>| path.map(|path| base.join(path));
    Self {
      entry: anchor(self.entry),
      output: anchor(self.output),
      manifest: anchor(self.manifest),
      resolve: self.resolve,
    }
  }
}
