//! Serialisation of a resolved module graph into one self-starting script.

pub mod emit;
pub mod manifest;
pub mod runtime;
pub mod table;

pub use emit::emit_bundle;
pub use manifest::render_manifest;
pub use table::{BundleEntry, BundleTable};
