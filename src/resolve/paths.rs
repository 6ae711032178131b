use std::path::{Component, Path, PathBuf};

/// Join a specifier onto the importing module's directory.
///
/// Absolute specifiers replace the directory entirely. Forward slashes are accepted on every
/// platform because specifiers are written in source code, not in native path syntax.
pub fn join_specifier(directory: &Path, specifier: &str) -> PathBuf {
  let relative: PathBuf = specifier
    .split('/')
    .filter(|segment| !segment.is_empty())
    .collect();
  let joined = if specifier.starts_with('/') {
    Path::new("/").join(relative)
  } else {
    directory.join(relative)
  };
  normalize_path(&joined)
}

/// Lexically collapse `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        let can_pop = matches!(
          normalized.components().next_back(),
          Some(Component::Normal(_))
        );
        if can_pop {
          normalized.pop();
        } else if !normalized.has_root() {
          normalized.push("..");
        }
      }
      other => normalized.push(other.as_os_str()),
    }
  }
  normalized
}
