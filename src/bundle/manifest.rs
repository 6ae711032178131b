//! Build manifest describing which file every bundled identity came from.

use crate::models::{BundleManifestSummary, ModuleGraph};

/// Serialise the module graph summary as prettified JSON.
pub fn render_manifest(graph: &ModuleGraph) -> serde_json::Result<String> {
  serde_json::to_string_pretty(&BundleManifestSummary::from(graph))
}
