//! Source control abstraction
//!
//! The rewrite engine and the tag driver only talk to an [`ScmProvider`]:
//!
//! - [git::GitScmProvider]: annotated tags through `git2`, optionally pushed
//! - [mock::MockScmProvider]: records calls for tests
//!
//! ```rust
//! # use std::path::Path;
//! # use pom_release::scm::{ScmProvider, TagParameters};
//! # fn example<P: ScmProvider>(scm: &P) -> pom_release::Result<()> {
//! let params = TagParameters::new("[release] copy for tag v1.0");
//! let result = scm.tag(Path::new("."), "v1.0", &params)?;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

pub mod git;
pub mod mock;
pub mod tag;

pub use git::GitScmProvider;
pub use mock::{MockScmProvider, ScmCall};
pub use tag::{ScmTagDriver, TagSettings};

use std::path::Path;

use crate::error::Result;

/// Outcome reported by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmResult {
    pub success: bool,
    pub message: String,
}

impl ScmResult {
    pub fn success(message: impl Into<String>) -> Self {
        ScmResult {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ScmResult {
            success: false,
            message: message.into(),
        }
    }
}

/// Options for creating a tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagParameters {
    pub message: String,
    /// Publish the tag on the remote instead of only locally
    pub remote_tagging: bool,
    /// Revision to tag, the current head when absent
    pub revision: Option<String>,
}

impl TagParameters {
    pub fn new(message: impl Into<String>) -> Self {
        TagParameters {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Source control operations used during a release
///
/// Implementors must be `Send + Sync`. Provider-level refusals are returned
/// as an unsuccessful [`ScmResult`]; errors are reserved for failures to talk
/// to the repository at all.
pub trait ScmProvider: Send + Sync {
    /// Make `file` writable before it is modified
    ///
    /// # Arguments
    /// * `working_dir` - Root of the working copy
    /// * `file` - Descriptor about to be rewritten
    fn enable_edit(&self, working_dir: &Path, file: &Path) -> Result<ScmResult>;

    /// Tag the working copy rooted at `working_dir` with `label`
    fn tag(&self, working_dir: &Path, label: &str, params: &TagParameters) -> Result<ScmResult>;

    /// Whether files must be opened for edit before writing
    fn requires_edit_mode(&self) -> bool;
}
