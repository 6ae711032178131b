use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{BundleError, BundleResult};
use crate::models::{Asset, ModuleId, SpecifierMap};
use crate::transform::SourceTransformer;

/// Reads and transforms one module at a time, handing out identities in build order.
///
/// Each builder owns its counter, so every build starts again from `0` and independent builds
/// never observe each other's identities.
pub struct AssetBuilder<T> {
  transformer: T,
  next_id: usize,
}

impl<T: SourceTransformer> AssetBuilder<T> {
  /// Create a builder whose first asset receives [`ModuleId::ENTRY`].
  pub fn new(transformer: T) -> Self {
    Self {
      transformer,
      next_id: 0,
    }
  }

  /// Read `path`, transform it and assign the next identity.
  pub fn build(&mut self, path: &Path) -> BundleResult<Asset> {
    let source = fs::read_to_string(path).map_err(|source| BundleError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let transformed =
      self
        .transformer
        .transform(&source)
        .map_err(|source| BundleError::Transform {
          path: path.to_path_buf(),
          source,
        })?;

    let id = ModuleId(self.next_id);
    self.next_id += 1;

    debug!(
      id = %id,
      path = %path.display(),
      dependencies = transformed.dependencies.len(),
      "built asset"
    );

    Ok(Asset {
      id,
      path: path.to_path_buf(),
      dependencies: transformed.dependencies,
      code: transformed.code,
      mapping: SpecifierMap::new(),
    })
  }

  /// Number of assets built so far.
  pub fn built(&self) -> usize {
    self.next_id
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::transform::EsmTransformer;
  use tempfile::tempdir;

  #[test]
  fn assigns_monotonic_identities_from_zero() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a.js");
    let second = dir.path().join("b.js");
    fs::write(&first, "module.exports = 1;").unwrap();
    fs::write(&second, "module.exports = 2;").unwrap();

    let mut builder = AssetBuilder::new(EsmTransformer);
    assert_eq!(builder.build(&first).unwrap().id, ModuleId(0));
    assert_eq!(builder.build(&second).unwrap().id, ModuleId(1));
    assert_eq!(builder.build(&first).unwrap().id, ModuleId(2));
    assert_eq!(builder.built(), 3);

    let mut fresh = AssetBuilder::new(EsmTransformer);
    assert_eq!(fresh.build(&second).unwrap().id, ModuleId::ENTRY);
  }

  #[test]
  fn keeps_dependency_order_and_duplicates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("entry.js");
    fs::write(
      &path,
      "import b from './b.js';\nimport a from './a.js';\nimport again from './b.js';\n",
    )
    .unwrap();

    let asset = AssetBuilder::new(EsmTransformer).build(&path).unwrap();
    assert_eq!(asset.dependencies, vec!["./b.js", "./a.js", "./b.js"]);
    assert!(asset.mapping.is_empty());
    assert_eq!(asset.path, path);
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.js");

    let mut builder = AssetBuilder::new(EsmTransformer);
    let err = builder.build(&missing).unwrap_err();
    assert!(matches!(err, BundleError::Read { ref path, .. } if path == &missing));
    assert_eq!(builder.built(), 0);
  }

  #[test]
  fn invalid_source_is_a_transform_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.js");
    fs::write(&path, "export default (;\n").unwrap();

    let err = AssetBuilder::new(EsmTransformer).build(&path).unwrap_err();
    assert!(matches!(err, BundleError::Transform { path: ref failed, .. } if failed == &path));
  }
}
