pub mod manifest;
pub mod resolver;
pub mod source;
pub mod template_cache;

pub use manifest::Manifest;
pub use source::{HttpManifestSource, ManifestSource};
pub use template_cache::TemplateCache;
