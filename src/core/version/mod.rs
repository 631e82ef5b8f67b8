pub mod manifest;
pub mod resolver;

pub use manifest::{ArtifactDownload, Channel, Platform, VersionEntry, VersionManifest};
pub use resolver::{ResolvedArtifact, VersionResolver};
