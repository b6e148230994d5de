//! Domain model - modules, artifact keys and version maps

pub mod artifact;
pub mod mode;
pub mod module;
pub mod reactor;

pub use artifact::{ArtifactKey, ResolvedSnapshot, ResolvedSnapshots, VersionMap, DEFAULT_PLUGIN_GROUP};
pub use mode::RewriteMode;
pub use module::{Module, ParentRef, ScmInfo};
pub use reactor::Reactor;
