//! Helpers for turning import specifiers into module paths on disk.
//!
//! Resolution is split the same way the checks are tested: classifying specifiers,
//! normalising joined paths, and expanding the candidate list for the configured
//! extension and index-file policy.

mod candidates;
mod filters;
mod paths;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, BundleResult};

pub use candidates::generate_path_candidates;
pub use filters::is_bare_specifier;
pub use paths::{join_specifier, normalize_path};

/// Policy for inferring file names that a specifier leaves implicit.
///
/// The default performs no inference: a specifier must name an existing file exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
  /// Extensions tried, in order, when the exact path is not a file (e.g. `.js`).
  pub extensions: Vec<String>,
  /// File names tried, in order, inside a directory the specifier points at.
  pub index_files: Vec<String>,
}

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
  /// Canonical path of the module file.
  Found(PathBuf),
  /// No candidate exists; carries the normalised path that was looked for.
  Missing(PathBuf),
}

/// Resolve `specifier` relative to `directory` under `options`.
///
/// Candidates that do not exist are skipped; any other I/O failure is reported as a read
/// error for that candidate.
pub fn resolve_specifier(
  directory: &Path,
  specifier: &str,
  options: &ResolveOptions,
) -> BundleResult<Resolved> {
  let base = join_specifier(directory, specifier);
  for candidate in generate_path_candidates(&base, options) {
    match candidate.canonicalize() {
      Ok(canonical) if canonical.is_file() => return Ok(Resolved::Found(canonical)),
      Ok(_) => {}
      Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {}
      Err(source) => {
        return Err(BundleError::Read {
          path: candidate,
          source,
        });
      }
    }
  }
  Ok(Resolved::Missing(base))
}
