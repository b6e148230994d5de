use std::path::Path;
use std::sync::Mutex;

use git2::{ErrorCode, ObjectType, Repository};

use super::{ScmProvider, ScmResult, TagParameters};
use crate::error::{ReleaseError, Result};

/// Provider backed by a local git repository
pub struct GitScmProvider {
    repo: Mutex<Repository>,
    remote: String,
    push_changes: bool,
}

impl GitScmProvider {
    /// Open or discover the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(GitScmProvider::from_git2(repo))
    }

    /// Create from an existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        GitScmProvider {
            repo: Mutex::new(repo),
            remote: "origin".to_string(),
            push_changes: true,
        }
    }

    /// Remote that receives tags when remote tagging is requested
    pub fn with_remote(mut self, remote: impl Into<String>, push_changes: bool) -> Self {
        self.remote = remote.into();
        self.push_changes = push_changes;
        self
    }

    fn push_tag(&self, repo: &Repository, label: &str) -> Result<()> {
        let mut remote = repo
            .find_remote(&self.remote)
            .map_err(|e| ReleaseError::scm(format!("Cannot find remote '{}': {}", self.remote, e)))?;

        let refspec = format!("refs/tags/{}:refs/tags/{}", label, label);
        remote
            .push(&[refspec.as_str()], None)
            .map_err(|e| ReleaseError::scm(format!("Push failed: {}", e)))?;
        Ok(())
    }
}

impl ScmProvider for GitScmProvider {
    fn enable_edit(&self, _working_dir: &Path, file: &Path) -> Result<ScmResult> {
        Ok(ScmResult::success(format!(
            "{} needs no edit request",
            file.display()
        )))
    }

    fn tag(&self, working_dir: &Path, label: &str, params: &TagParameters) -> Result<ScmResult> {
        let repo = self
            .repo
            .lock()
            .map_err(|_| ReleaseError::scm("repository lock poisoned"))?;

        match repo.find_reference(&format!("refs/tags/{}", label)) {
            Ok(_) => return Ok(ScmResult::failure(format!("Tag '{}' already exists", label))),
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let target = match &params.revision {
            Some(revision) => repo.revparse_single(revision)?,
            None => repo.head()?.peel(ObjectType::Commit)?,
        };
        let signature = repo.signature()?;
        let oid = repo.tag(label, &target, &signature, &params.message, false)?;
        tracing::debug!(
            "Tagged {} in {} as {} ({})",
            target.id(),
            working_dir.display(),
            label,
            oid
        );

        if params.remote_tagging && self.push_changes {
            self.push_tag(&repo, label)?;
            return Ok(ScmResult::success(format!(
                "Tag '{}' created and pushed to '{}'",
                label, self.remote
            )));
        }

        Ok(ScmResult::success(format!("Tag '{}' created", label)))
    }

    fn requires_edit_mode(&self) -> bool {
        false
    }
}
