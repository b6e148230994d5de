use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::{ScmProvider, ScmResult, TagParameters};
use crate::domain::Reactor;
use crate::error::{ReleaseError, Result};

/// Settings for tagging a release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSettings {
    pub release_label: Option<String>,
    pub comment_prefix: String,
    pub remote_tagging: bool,
    pub revision: Option<String>,
    pub wait_before_tagging: u64,
    pub working_directory: PathBuf,
    /// Repository URL shown when simulating a remote tag
    pub source_url: Option<String>,
}

impl TagSettings {
    /// Commit message of the tag
    pub fn tag_message(&self, label: &str) -> String {
        format!("{}copy for tag {}", self.comment_prefix, label)
    }

    fn label(&self) -> Result<&str> {
        self.release_label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .ok_or(ReleaseError::MissingReleaseLabel)
    }
}

/// Tags the released working copy once every descriptor is rewritten
pub struct ScmTagDriver<'a> {
    provider: &'a dyn ScmProvider,
    settings: TagSettings,
}

impl<'a> ScmTagDriver<'a> {
    pub fn new(provider: &'a dyn ScmProvider, settings: TagSettings) -> Self {
        ScmTagDriver { provider, settings }
    }

    /// Tag the aligned working copy
    ///
    /// # Returns
    /// * `Ok(ScmResult)` - The provider's successful result
    /// * `Err` - No release label, provider error, or a refused tag
    pub fn execute(&self, reactor: &Reactor) -> Result<ScmResult> {
        let label = self.settings.label()?;

        if self.settings.wait_before_tagging > 0 {
            tracing::info!(
                "Waiting for {} seconds before tagging the release.",
                self.settings.wait_before_tagging
            );
            thread::sleep(Duration::from_secs(self.settings.wait_before_tagging));
        }

        tracing::info!("Tagging release with the label {}...", label);
        let working_dir = self.aligned_working_dir(reactor);
        let params = TagParameters {
            message: self.settings.tag_message(label),
            remote_tagging: self.settings.remote_tagging,
            revision: self.settings.revision.clone(),
        };
        tracing::debug!(
            "Tag parameters: remote tagging {}, revision {:?}, working copy {}",
            params.remote_tagging,
            params.revision,
            working_dir.display()
        );

        let result = self.provider.tag(&working_dir, label, &params)?;
        if !result.success {
            return Err(ReleaseError::scm(format!(
                "Unable to tag SCM: {}",
                result.message
            )));
        }
        Ok(result)
    }

    /// Describe what [`execute`](Self::execute) would tag without calling
    /// the provider
    pub fn simulate(&self, reactor: &Reactor) -> Result<String> {
        let label = self.settings.label()?;
        let working_dir = self.aligned_working_dir(reactor);

        let description = match (&self.settings.source_url, self.settings.remote_tagging) {
            (Some(url), true) => format!(
                "Full run would be tagging remotely {} with label: '{}'",
                url, label
            ),
            _ => format!(
                "Full run would be tagging working copy {} with label: '{}'",
                working_dir.display(),
                label
            ),
        };
        tracing::info!("{}", description);
        Ok(description)
    }

    /// The reactor's common base directory when it lies inside the configured
    /// working directory, the working directory otherwise
    pub fn aligned_working_dir(&self, reactor: &Reactor) -> PathBuf {
        aligned_working_dir(&self.settings.working_directory, reactor.common_basedir())
    }
}

fn aligned_working_dir(working_dir: &Path, basedir: Option<PathBuf>) -> PathBuf {
    match basedir {
        Some(basedir) if basedir.starts_with(working_dir) => basedir,
        _ => working_dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Module;
    use crate::scm::{MockScmProvider, ScmCall};
    use crate::xml::Document;

    fn reactor(paths: &[&str]) -> Reactor {
        let modules = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let xml = format!(
                    "<project><groupId>g</groupId><artifactId>m{}</artifactId><version>1</version></project>",
                    i
                );
                let doc = Document::parse(&xml, "\n").unwrap();
                Module::from_root(Path::new(path), &doc.root).unwrap()
            })
            .collect();
        Reactor::new(modules)
    }

    fn settings(label: Option<&str>) -> TagSettings {
        TagSettings {
            release_label: label.map(str::to_string),
            comment_prefix: "[release] ".to_string(),
            working_directory: PathBuf::from("/work"),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_label_fails_before_provider_call() {
        let mock = MockScmProvider::new();
        let driver = ScmTagDriver::new(&mock, settings(None));
        let err = driver.execute(&reactor(&["/work/pom.xml"])).unwrap_err();
        assert!(matches!(err, ReleaseError::MissingReleaseLabel));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_tags_aligned_basedir_with_message() {
        let mock = MockScmProvider::new();
        let mut s = settings(Some("app-1.0"));
        s.revision = Some("abc123".to_string());
        let driver = ScmTagDriver::new(&mock, s);

        driver
            .execute(&reactor(&["/work/app/pom.xml", "/work/app/core/pom.xml"]))
            .unwrap();

        match &mock.calls()[0] {
            ScmCall::Tag {
                working_dir,
                label,
                params,
            } => {
                assert_eq!(working_dir, &PathBuf::from("/work/app"));
                assert_eq!(label, "app-1.0");
                assert_eq!(params.message, "[release] copy for tag app-1.0");
                assert_eq!(params.revision.as_deref(), Some("abc123"));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_refused_tag_is_an_error() {
        let mock = MockScmProvider::new().failing_tag();
        let driver = ScmTagDriver::new(&mock, settings(Some("v1")));
        let err = driver.execute(&reactor(&["/work/pom.xml"])).unwrap_err();
        assert!(err.to_string().contains("Unable to tag SCM"));
    }

    #[test]
    fn test_simulate_does_not_call_provider() {
        let mock = MockScmProvider::new();
        let driver = ScmTagDriver::new(&mock, settings(Some("v1")));
        let description = driver.simulate(&reactor(&["/work/pom.xml"])).unwrap();
        assert!(description.contains("working copy /work"));
        assert!(description.contains("'v1'"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_basedir_outside_working_dir_is_ignored() {
        assert_eq!(
            aligned_working_dir(Path::new("/work"), Some(PathBuf::from("/elsewhere"))),
            PathBuf::from("/work")
        );
        assert_eq!(aligned_working_dir(Path::new("/work"), None), PathBuf::from("/work"));
    }
}
