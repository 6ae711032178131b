//! Error taxonomy for a bundle build.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the build pipeline.
pub type BundleResult<T> = Result<T, BundleError>;

/// Source text that the transformer cannot express in the portable convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct DialectError {
  /// 1-based line the problem was detected on.
  pub line: usize,
  /// Human readable description of the unsupported construct.
  pub message: String,
}

impl DialectError {
  /// Build an error for the line containing byte `offset` of `source`.
  pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
    let offset = offset.min(source.len());
    let line = source.as_bytes()[..offset]
      .iter()
      .filter(|byte| **byte == b'\n')
      .count()
      + 1;
    Self {
      line,
      message: message.into(),
    }
  }
}

/// Fatal build failures. A build that returns one of these emits no bundle.
#[derive(Debug, Error)]
pub enum BundleError {
  /// A module file is missing or unreadable.
  #[error("failed to read module {}: {source}", .path.display())]
  Read {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Module text is outside the supported module dialect.
  #[error("failed to transform {}: {source}", .path.display())]
  Transform {
    /// Module whose source was rejected.
    path: PathBuf,
    /// Transformer diagnostic.
    #[source]
    source: DialectError,
  },
  /// An import specifier does not name an existing file.
  #[error(
    "cannot resolve \"{specifier}\" imported from {} (looked for {}){}",
    .importer.display(),
    .attempted.display(),
    bare_hint(.bare)
  )]
  Resolution {
    /// Literal specifier as written in the importing module.
    specifier: String,
    /// Module containing the failing import.
    importer: PathBuf,
    /// Normalised path the specifier was resolved to.
    attempted: PathBuf,
    /// Whether the specifier was a bare package name rather than a path.
    bare: bool,
  },
  /// The build manifest could not be serialised.
  #[error("failed to serialise build manifest: {0}")]
  Manifest(#[from] serde_json::Error),
  /// Writing an output artifact failed.
  #[error("failed to write {}: {source}", .path.display())]
  Write {
    /// Destination path.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
}

fn bare_hint(bare: &bool) -> &'static str {
  if *bare {
    "; bare package specifiers are not supported"
  } else {
    ""
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dialect_error_reports_one_based_line() {
    let source = "let a = 1;\nlet b = 2;\nimport(\"x\");\n";
    let offset = source.find("import").unwrap();
    let err = DialectError::at(source, offset, "dynamic import");
    assert_eq!(err.line, 3);
    assert_eq!(err.to_string(), "line 3: dynamic import");
  }

  #[test]
  fn resolution_error_names_specifier_and_importer() {
    let err = BundleError::Resolution {
      specifier: "./missing.js".into(),
      importer: PathBuf::from("/src/entry.js"),
      attempted: PathBuf::from("/src/missing.js"),
      bare: false,
    };
    let message = err.to_string();
    assert!(message.contains("\"./missing.js\""));
    assert!(message.contains("/src/entry.js"));
    assert!(!message.contains("bare"));
  }

  #[test]
  fn resolution_error_flags_bare_specifiers() {
    let err = BundleError::Resolution {
      specifier: "lodash".into(),
      importer: PathBuf::from("/src/entry.js"),
      attempted: PathBuf::from("/src/lodash"),
      bare: true,
    };
    assert!(err.to_string().contains("bare package specifiers"));
  }
}
