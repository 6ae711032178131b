//! Source transformation seam between raw module text and the portable module convention.
//!
//! A transformer reports the statically declared dependency specifiers of a module and
//! rewrites its body so that it only talks to the three values the bundle runtime hands
//! every module: `require`, `module` and `exports`.

mod esm;
mod lexer;

pub use esm::EsmTransformer;
pub use lexer::mask_source;

use crate::error::DialectError;

/// Output of a successful transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformedModule {
  /// Dependency specifiers in order of appearance, duplicates preserved.
  pub dependencies: Vec<String>,
  /// Body expressed in the portable `require / module / exports` convention.
  pub code: String,
}

/// Turns module source text into a [`TransformedModule`].
pub trait SourceTransformer {
  /// Transform one module's source text.
  fn transform(&self, source: &str) -> Result<TransformedModule, DialectError>;
}

impl<T: SourceTransformer + ?Sized> SourceTransformer for &T {
  fn transform(&self, source: &str) -> Result<TransformedModule, DialectError> {
    (**self).transform(source)
  }
}
