//! Bundle build orchestrator: resolve the graph, lay out the table, emit the script.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::bundle::{BundleTable, emit_bundle, render_manifest};
use crate::error::{BundleError, BundleResult};
use crate::graph::GraphResolver;
use crate::models::ModuleGraph;
use crate::resolve::ResolveOptions;
use crate::transform::{EsmTransformer, SourceTransformer};

/// Everything a successful build produces.
#[derive(Debug, Clone)]
pub struct BundleArtifacts {
  /// The self-contained bundle script.
  pub code: String,
  /// Build manifest serialised as prettified JSON.
  pub manifest_json: String,
  /// Every source file read during the build, in identity order.
  pub inputs: Vec<PathBuf>,
}

/// High-level helper running a complete build for one entry module.
pub struct Bundler<T = EsmTransformer> {
  resolver: GraphResolver<T>,
}

impl Bundler<EsmTransformer> {
  /// Create a bundler using the ES module transformer.
  pub fn new(options: ResolveOptions) -> Self {
    Self::with_transformer(EsmTransformer, options)
  }
}

impl<T: SourceTransformer> Bundler<T> {
  /// Create a bundler with a custom source transformer.
  pub fn with_transformer(transformer: T, options: ResolveOptions) -> Self {
    Self {
      resolver: GraphResolver::new(transformer, options),
    }
  }

  /// Resolve only the module graph for `entry`.
  pub fn graph(&self, entry: &Path) -> BundleResult<ModuleGraph> {
    self.resolver.resolve(entry)
  }

  /// Run the whole build. Nothing is written; see [`BundleArtifacts::write`].
  pub fn build(&self, entry: &Path) -> BundleResult<BundleArtifacts> {
    let graph = self.graph(entry)?;
    let table = BundleTable::from(&graph);
    let code = emit_bundle(&table);
    let manifest_json = render_manifest(&graph)?;
    let inputs = graph
      .assets()
      .iter()
      .map(|asset| asset.path.clone())
      .collect();

    info!(
      entry = %entry.display(),
      modules = graph.len(),
      bytes = code.len(),
      "bundle built"
    );

    Ok(BundleArtifacts {
      code,
      manifest_json,
      inputs,
    })
  }
}

impl BundleArtifacts {
  /// Write the bundle to `output` (standard output when `None`) and the manifest when requested.
  pub fn write(&self, output: Option<&Path>, manifest: Option<&Path>) -> BundleResult<()> {
    match output {
      Some(path) => write_file(path, &self.code)?,
      None => {
        let mut stdout = std::io::stdout().lock();
        stdout
          .write_all(self.code.as_bytes())
          .and_then(|_| stdout.flush())
          .map_err(|source| BundleError::Write {
            path: PathBuf::from("<stdout>"),
            source,
          })?;
      }
    }

    if let Some(path) = manifest {
      write_file(path, &self.manifest_json)?;
    }
    Ok(())
  }
}

fn write_file(path: &Path, contents: &str) -> BundleResult<()> {
  let to_error = |source| BundleError::Write {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(to_error)?;
  }
  fs::write(path, contents).map_err(to_error)?;
  info!(path = %path.display(), bytes = contents.len(), "wrote artifact");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn builds_bundle_manifest_and_inputs() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("entry.js"),
      "import message from './message.js';\nconsole.log(message);\n",
    )
    .unwrap();
    fs::write(dir.path().join("message.js"), "export default 'hi';\n").unwrap();

    let artifacts = Bundler::new(ResolveOptions::default())
      .build(&dir.path().join("entry.js"))
      .unwrap();

    assert!(artifacts.code.contains("  0: [\n"));
    assert!(artifacts.code.contains("{\"./message.js\":1}"));
    assert!(artifacts.code.contains("requireById(0);"));
    assert!(artifacts.manifest_json.contains("\"./message.js\": 1"));
    assert_eq!(artifacts.inputs.len(), 2);
    assert_eq!(
      artifacts.inputs[0],
      dir.path().join("entry.js").canonicalize().unwrap()
    );
  }

  #[test]
  fn failed_build_produces_no_artifacts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("entry.js"), "import x from './missing.js';\n").unwrap();

    let result = Bundler::new(ResolveOptions::default()).build(&dir.path().join("entry.js"));
    assert!(matches!(result, Err(BundleError::Resolution { .. })));
  }

  #[test]
  fn writes_outputs_creating_parent_directories() {
    let dir = tempdir().unwrap();
    let artifacts = BundleArtifacts {
      code: "bundle".into(),
      manifest_json: "{}".into(),
      inputs: Vec::new(),
    };
    let output = dir.path().join("dist/app/bundle.js");
    let manifest = dir.path().join("dist/manifest.json");

    artifacts.write(Some(&output), Some(&manifest)).unwrap();
    assert_eq!(fs::read_to_string(output).unwrap(), "bundle");
    assert_eq!(fs::read_to_string(manifest).unwrap(), "{}");
  }

  #[test]
  fn output_into_a_file_path_reports_write_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").unwrap();
    let artifacts = BundleArtifacts {
      code: "bundle".into(),
      manifest_json: "{}".into(),
      inputs: Vec::new(),
    };

    let err = artifacts
      .write(Some(&blocker.join("bundle.js")), None)
      .unwrap_err();
    assert!(matches!(err, BundleError::Write { .. }));
  }
}
