//! Release version rewriting
//!
//! A run has two passes. The first collects snapshot-valued properties from
//! every module ([`properties`]). The second rewrites each descriptor in
//! reactor order ([`artifacts`]), hands the tree to an [`ScmTransform`] and
//! writes it back ([`writer`]). [`RewriteEngine`] drives both passes.

pub mod artifacts;
pub mod context;
pub mod decision;
pub mod engine;
pub mod properties;
pub mod transform;
pub mod writer;

pub use context::{PropertyVersions, VersionTables};
pub use decision::{decide, PropertyLookup, ReferenceFacts, VersionDecision};
pub use engine::{
    default_line_separator, ReactorVersions, RewriteEngine, RewriteOptions, RewriteReport,
    StaticVersionMap, VersionMapProvider,
};
pub use transform::{translate_url_path, NoopScmTransform, ScmContext, ScmTagTransform, ScmTransform};
