use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::AssetBuilder;
use crate::error::{BundleError, BundleResult};
use crate::models::{ModuleGraph, ModuleId, SpecifierMap};
use crate::resolve::{ResolveOptions, Resolved, is_bare_specifier, resolve_specifier};
use crate::transform::SourceTransformer;

/// Breadth-first dependency graph builder.
///
/// Modules are deduplicated by canonical path, so import cycles, diamonds and self-imports all
/// map onto a single asset and the walk always terminates.
pub struct GraphResolver<T> {
  transformer: T,
  options: ResolveOptions,
}

impl<T: SourceTransformer> GraphResolver<T> {
  /// Create a resolver using `transformer` for every module and `options` for specifiers.
  pub fn new(transformer: T, options: ResolveOptions) -> Self {
    Self {
      transformer,
      options,
    }
  }

  /// Resolution policy in use.
  pub fn options(&self) -> &ResolveOptions {
    &self.options
  }

  /// Build the reachability-closed graph for `entry`. The entry module is always identity `0`.
  pub fn resolve(&self, entry: &Path) -> BundleResult<ModuleGraph> {
    let entry_path = entry.canonicalize().map_err(|source| BundleError::Read {
      path: entry.to_path_buf(),
      source,
    })?;

    let mut builder = AssetBuilder::new(&self.transformer);
    let mut assets = vec![builder.build(&entry_path)?];
    let mut by_path: BTreeMap<PathBuf, ModuleId> = BTreeMap::new();
    by_path.insert(entry_path, ModuleId::ENTRY);
    let mut queue = VecDeque::from([ModuleId::ENTRY]);

    while let Some(current) = queue.pop_front() {
      let (directory, importer, dependencies) = {
        let asset = &assets[current.index()];
        (
          asset.directory().to_path_buf(),
          asset.path.clone(),
          asset.dependencies.clone(),
        )
      };

      let mut mapping = SpecifierMap::new();
      for specifier in dependencies {
        if mapping.contains_key(&specifier) {
          continue;
        }

        let path = match resolve_specifier(&directory, &specifier, &self.options)? {
          Resolved::Found(path) => path,
          Resolved::Missing(attempted) => {
            return Err(BundleError::Resolution {
              bare: is_bare_specifier(&specifier),
              specifier,
              importer,
              attempted,
            });
          }
        };

        let target = match by_path.get(&path) {
          Some(existing) => *existing,
          None => {
            let asset = builder.build(&path)?;
            let id = asset.id;
            by_path.insert(path, id);
            assets.push(asset);
            queue.push_back(id);
            id
          }
        };

        debug!(
          importer = %importer.display(),
          specifier = specifier.as_str(),
          target = %target,
          "resolved specifier"
        );
        mapping.insert(specifier, target);
      }

      assets[current.index()].mapping = mapping;
    }

    Ok(ModuleGraph::from_assets(assets))
  }
}
