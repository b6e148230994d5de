use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{ScmProvider, ScmResult, TagParameters};
use crate::error::Result;

/// A call received by [`MockScmProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmCall {
    Edit {
        working_dir: PathBuf,
        file: PathBuf,
    },
    Tag {
        working_dir: PathBuf,
        label: String,
        params: TagParameters,
    },
}

/// Mock provider for testing without a repository
#[derive(Default)]
pub struct MockScmProvider {
    calls: Mutex<Vec<ScmCall>>,
    requires_edit: bool,
    fail_edit: bool,
    fail_tag: bool,
}

impl MockScmProvider {
    /// Create a provider that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that files must be opened for edit
    pub fn requiring_edit_mode(mut self) -> Self {
        self.requires_edit = true;
        self
    }

    /// Refuse every edit request
    pub fn failing_edit(mut self) -> Self {
        self.fail_edit = true;
        self
    }

    /// Refuse every tag request
    pub fn failing_tag(mut self) -> Self {
        self.fail_tag = true;
        self
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<ScmCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ScmCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ScmProvider for MockScmProvider {
    fn enable_edit(&self, working_dir: &Path, file: &Path) -> Result<ScmResult> {
        self.record(ScmCall::Edit {
            working_dir: working_dir.to_path_buf(),
            file: file.to_path_buf(),
        });
        if self.fail_edit {
            Ok(ScmResult::failure(format!("{} is locked", file.display())))
        } else {
            Ok(ScmResult::success("edit enabled"))
        }
    }

    fn tag(&self, working_dir: &Path, label: &str, params: &TagParameters) -> Result<ScmResult> {
        self.record(ScmCall::Tag {
            working_dir: working_dir.to_path_buf(),
            label: label.to_string(),
            params: params.clone(),
        });
        if self.fail_tag {
            Ok(ScmResult::failure(format!("cannot tag {}", label)))
        } else {
            Ok(ScmResult::success(format!("tagged {}", label)))
        }
    }

    fn requires_edit_mode(&self) -> bool {
        self.requires_edit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let mock = MockScmProvider::new();
        mock.enable_edit(Path::new("/w"), Path::new("/w/pom.xml")).unwrap();
        mock.tag(Path::new("/w"), "v1", &TagParameters::new("m")).unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[1], ScmCall::Tag { label, .. } if label == "v1"));
    }

    #[test]
    fn test_mock_scripted_failures() {
        let mock = MockScmProvider::new().failing_edit().failing_tag();
        assert!(!mock.enable_edit(Path::new("."), Path::new("pom.xml")).unwrap().success);
        assert!(!mock.tag(Path::new("."), "v1", &TagParameters::default()).unwrap().success);
        assert!(!mock.requires_edit_mode());
        assert!(MockScmProvider::new().requiring_edit_mode().requires_edit_mode());
    }
}
