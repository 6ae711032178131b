//! Structured bundle table, kept as data until the emitter renders it.

use crate::models::{ModuleGraph, ModuleId, SpecifierMap};

/// One row of the bundle table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
  /// Identity the runtime looks the module up by.
  pub id: ModuleId,
  /// Module body in the portable convention.
  pub code: String,
  /// Specifier to identity table handed to the module's scoped `require`.
  pub mapping: SpecifierMap,
}

/// Identity-keyed table of module bodies, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleTable {
  entries: Vec<BundleEntry>,
  entry: ModuleId,
}

impl BundleTable {
  /// Create a table whose loader starts from [`ModuleId::ENTRY`].
  pub fn new(entries: Vec<BundleEntry>) -> Self {
    Self {
      entries,
      entry: ModuleId::ENTRY,
    }
  }

  /// Rows in emission order.
  pub fn entries(&self) -> &[BundleEntry] {
    &self.entries
  }

  /// Identity executed when the bundle loads.
  pub fn entry(&self) -> ModuleId {
    self.entry
  }
}

impl From<&ModuleGraph> for BundleTable {
  fn from(graph: &ModuleGraph) -> Self {
    Self::new(
      graph
        .assets()
        .iter()
        .map(|asset| BundleEntry {
          id: asset.id,
          code: asset.code.clone(),
          mapping: asset.mapping.clone(),
        })
        .collect(),
    )
  }
}
