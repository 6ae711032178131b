use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use modpack::{Bundler, BundlerConfig};

/// Bundle ES modules into one self-contained script.
#[derive(Debug, Parser)]
#[command(name = "modpack", version, about)]
struct Cli {
  /// Entry module; overrides the configured entry.
  entry: Option<PathBuf>,
  /// Write the bundle here instead of standard output.
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,
  /// Also write a JSON build manifest here.
  #[arg(long, value_name = "FILE")]
  manifest: Option<PathBuf>,
  /// Configuration file to use instead of ./modpack.config.json.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,
  /// Extension to try when a specifier names no file exactly (repeatable).
  #[arg(long = "extension", value_name = "EXT")]
  extensions: Vec<String>,
  /// Index file to try when a specifier names a directory (repeatable).
  #[arg(long = "index-file", value_name = "NAME")]
  index_files: Vec<String>,
  /// Log every built module and resolved specifier.
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn load_config(&self) -> Result<BundlerConfig> {
    match &self.config {
      Some(path) => BundlerConfig::from_path(path).map_err(Into::into),
      None => {
        let cwd = std::env::current_dir().context("failed to read the working directory")?;
        BundlerConfig::discover(&cwd).map_err(Into::into)
      }
    }
  }

  fn apply(self, mut config: BundlerConfig) -> BundlerConfig {
    if self.entry.is_some() {
      config.entry = self.entry;
    }
    if self.output.is_some() {
      config.output = self.output;
    }
    if self.manifest.is_some() {
      config.manifest = self.manifest;
    }
    if !self.extensions.is_empty() {
      config.resolve.extensions = self.extensions;
    }
    if !self.index_files.is_empty() {
      config.resolve.index_files = self.index_files;
    }
    config
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  install_tracing(cli.verbose);

  let config = cli.load_config()?;
  let config = cli.apply(config);
  let Some(entry) = config.entry.as_deref() else {
    bail!("no entry module given; pass ENTRY or set \"entry\" in modpack.config.json");
  };

  let artifacts = Bundler::new(config.resolve.clone())
    .build(entry)
    .with_context(|| format!("failed to bundle {}", entry.display()))?;
  artifacts
    .write(config.output.as_deref(), config.manifest.as_deref())
    .context("failed to write bundle outputs")?;
  Ok(())
}

fn install_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}
