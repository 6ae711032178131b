//! Data structures produced while building a bundle.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Small integer naming a module within one build. The entry module is always `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub usize);

impl ModuleId {
  /// Identity reserved for the entry module.
  pub const ENTRY: ModuleId = ModuleId(0);

  /// Position of the module in build order.
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for ModuleId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Mapping from a literal import specifier to the identity it resolves to.
pub type SpecifierMap = BTreeMap<String, ModuleId>;

/// One resolved module.
#[derive(Debug, Clone)]
pub struct Asset {
  /// Identity assigned when the asset was built. Never reassigned.
  pub id: ModuleId,
  /// Canonical absolute path; the unit of deduplication.
  pub path: PathBuf,
  /// Raw specifiers in source order, duplicates preserved.
  pub dependencies: Vec<String>,
  /// Transformed body in the portable `require / module / exports` convention.
  pub code: String,
  /// Specifier to identity table, filled in by the graph resolver.
  pub mapping: SpecifierMap,
}

impl Asset {
  /// Directory relative specifiers of this module resolve against.
  pub fn directory(&self) -> &Path {
    self.path.parent().unwrap_or_else(|| Path::new("/"))
  }
}

/// Reachability-closed set of assets, stored in identity order.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
  assets: Vec<Asset>,
}

impl ModuleGraph {
  pub(crate) fn from_assets(assets: Vec<Asset>) -> Self {
    debug_assert!(
      assets
        .iter()
        .enumerate()
        .all(|(index, asset)| asset.id.index() == index)
    );
    Self { assets }
  }

  /// Assets in build order; `assets()[n].id == ModuleId(n)`.
  pub fn assets(&self) -> &[Asset] {
    &self.assets
  }

  /// Look up an asset by identity.
  pub fn get(&self, id: ModuleId) -> Option<&Asset> {
    self.assets.get(id.index())
  }

  /// The entry module, when the graph is non-empty.
  pub fn entry(&self) -> Option<&Asset> {
    self.get(ModuleId::ENTRY)
  }

  /// Look up the asset built for a canonical path.
  pub fn find_by_path(&self, path: &Path) -> Option<&Asset> {
    self.assets.iter().find(|asset| asset.path == path)
  }

  /// Number of distinct modules in the graph.
  pub fn len(&self) -> usize {
    self.assets.len()
  }

  /// Returns true when no module has been resolved.
  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }
}

/// Serializable summary of one module in the build manifest.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModuleSummary {
  /// Module identity inside the emitted bundle.
  pub id: ModuleId,
  /// Source path the module was read from.
  pub path: String,
  /// Literal specifiers and the identities they resolved to.
  pub dependencies: SpecifierMap,
}

/// Serializable summary of a build, written next to the bundle on request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BundleManifestSummary {
  /// Entry module path.
  pub entry: String,
  /// Every module in identity order.
  pub modules: Vec<ModuleSummary>,
}

impl From<&ModuleGraph> for BundleManifestSummary {
  fn from(graph: &ModuleGraph) -> Self {
    Self {
      entry: graph
        .entry()
        .map(|asset| display_path(&asset.path))
        .unwrap_or_default(),
      modules: graph
        .assets()
        .iter()
        .map(|asset| ModuleSummary {
          id: asset.id,
          path: display_path(&asset.path),
          dependencies: asset.mapping.clone(),
        })
        .collect(),
    }
  }
}

fn display_path(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}
