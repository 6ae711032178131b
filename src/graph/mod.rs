//! Static discovery of every module reachable from an entry point.

mod asset;
mod resolver;

pub use asset::AssetBuilder;
pub use resolver::GraphResolver;
