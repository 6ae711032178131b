use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::ResolveOptions;

/// Generate the ordered file candidates a joined specifier may refer to.
///
/// The exact path always comes first, followed by the path with each configured extension
/// appended, then each configured index file inside the path treated as a directory.
/// Duplicates are dropped while keeping the first occurrence.
pub fn generate_path_candidates(base: &Path, options: &ResolveOptions) -> Vec<PathBuf> {
  let mut builder = CandidateBuilder::new(base, options);

  builder.add_exact_candidate();
  builder.add_extension_candidates();
  builder.add_index_candidates();

  builder.finish()
}

struct CandidateBuilder<'a> {
  base: &'a Path,
  options: &'a ResolveOptions,
  seen: BTreeSet<PathBuf>,
  result: Vec<PathBuf>,
}

impl<'a> CandidateBuilder<'a> {
  fn new(base: &'a Path, options: &'a ResolveOptions) -> Self {
    Self {
      base,
      options,
      seen: BTreeSet::new(),
      result: Vec::new(),
    }
  }

  fn add_exact_candidate(&mut self) {
    self.push(self.base.to_path_buf());
  }

  fn add_extension_candidates(&mut self) {
    if self.base.file_name().is_none() {
      return;
    }

    for extension in &self.options.extensions {
      let extension = extension.trim();
      if extension.is_empty() {
        continue;
      }
      let mut name = OsString::from(self.base.as_os_str());
      if !extension.starts_with('.') {
        name.push(".");
      }
      name.push(extension);
      self.push(PathBuf::from(name));
    }
  }

  fn add_index_candidates(&mut self) {
    for index in &self.options.index_files {
      let index = index.trim().trim_matches('/');
      if index.is_empty() {
        continue;
      }
      self.push(self.base.join(index));
    }
  }

  fn finish(self) -> Vec<PathBuf> {
    self.result
  }

  fn push(&mut self, candidate: PathBuf) {
    if self.seen.insert(candidate.clone()) {
      self.result.push(candidate);
    }
  }
}
