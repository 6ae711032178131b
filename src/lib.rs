#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod builder;
pub mod bundle;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod resolve;
pub mod transform;

pub use builder::{BundleArtifacts, Bundler};
pub use config::BundlerConfig;
pub use error::{BundleError, BundleResult, DialectError};
pub use graph::{AssetBuilder, GraphResolver};
pub use models::{Asset, ModuleGraph, ModuleId};
pub use resolve::ResolveOptions;
pub use transform::{EsmTransformer, SourceTransformer, TransformedModule};
