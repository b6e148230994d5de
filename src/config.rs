use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{ResolvedSnapshots, VersionMap};
use crate::error::{ReleaseError, Result};
use crate::rewrite::{default_line_separator, RewriteOptions};
use crate::scm::TagSettings;

/// Represents the complete release plan for pom-release.
///
/// Names the reactor's descriptors in build order, the rewrite and SCM settings, and the version
/// maps produced by the external resolver.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ReleaseConfig {
    /// Descriptor paths in reactor order, relative to the configuration file's directory
    #[serde(default)]
    pub reactor: Vec<PathBuf>,

    #[serde(default)]
    pub release: RewriteConfig,

    #[serde(default)]
    pub scm: ScmConfig,

    #[serde(default)]
    pub versions: VersionsConfig,

    #[serde(default)]
    pub resolved_snapshots: ResolvedSnapshots,
}

/// Returns true, the default for flags that are opt-out.
fn default_true() -> bool {
    true
}

/// Settings of the descriptor rewrite.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RewriteConfig {
    /// Line separator for every descriptor; the platform separator when absent
    #[serde(default)]
    pub line_separator: Option<String>,

    #[serde(default)]
    pub add_schema: bool,

    #[serde(default = "default_true")]
    pub update_dependencies: bool,

    #[serde(default)]
    pub scm_use_edit_mode: bool,

    #[serde(default = "default_true")]
    pub update_scm: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        RewriteConfig {
            line_separator: None,
            add_schema: false,
            update_dependencies: true,
            scm_use_edit_mode: false,
            update_scm: true,
        }
    }
}

fn default_working_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_comment_prefix() -> String {
    "[pom-release] ".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Source control settings.
///
/// Controls where the release is tagged and how the `<scm>` block is rewritten.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScmConfig {
    #[serde(default = "default_working_directory")]
    pub working_directory: PathBuf,

    #[serde(default)]
    pub release_label: Option<String>,

    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,

    #[serde(default = "default_true")]
    pub remote_tagging: bool,

    /// Revision to tag instead of HEAD
    #[serde(default)]
    pub revision: Option<String>,

    /// Seconds to wait before tagging
    #[serde(default)]
    pub wait_before_tagging: u64,

    #[serde(default = "default_true")]
    pub push_changes: bool,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub source_url: Option<String>,

    #[serde(default)]
    pub trunk_base: Option<String>,

    #[serde(default)]
    pub tag_base: Option<String>,
}

impl Default for ScmConfig {
    fn default() -> Self {
        ScmConfig {
            working_directory: default_working_directory(),
            release_label: None,
            comment_prefix: default_comment_prefix(),
            remote_tagging: true,
            revision: None,
            wait_before_tagging: 0,
            push_changes: true,
            remote: default_remote(),
            source_url: None,
            trunk_base: None,
            tag_base: None,
        }
    }
}

/// Version maps keyed by `groupId:artifactId`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct VersionsConfig {
    /// Version each module has after the run
    #[serde(default)]
    pub next: VersionMap,

    /// Version each module had before the run; read from the reactor when empty
    #[serde(default)]
    pub original: VersionMap,
}

impl ReleaseConfig {
    /// Resolve relative paths against `base`
    pub fn rebase(mut self, base: &Path) -> Self {
        for path in self.reactor.iter_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if self.scm.working_directory.is_relative() {
            self.scm.working_directory = base.join(&self.scm.working_directory);
        }
        self
    }

    /// Line separator for this run
    pub fn line_separator(&self) -> Result<String> {
        match self.release.line_separator.as_deref() {
            None => Ok(default_line_separator().to_string()),
            Some("\n") | Some("lf") | Some("LF") => Ok("\n".to_string()),
            Some("\r\n") | Some("crlf") | Some("CRLF") => Ok("\r\n".to_string()),
            Some("\r") | Some("cr") | Some("CR") => Ok("\r".to_string()),
            Some(other) => Err(ReleaseError::config(format!(
                "Unsupported line separator {:?}",
                other
            ))),
        }
    }

    /// Settings for the rewrite engine
    pub fn rewrite_options(&self) -> Result<RewriteOptions> {
        Ok(RewriteOptions {
            ls: self.line_separator()?,
            add_schema: self.release.add_schema,
            update_dependencies: self.release.update_dependencies,
            scm_use_edit_mode: self.release.scm_use_edit_mode,
            update_scm: self.release.update_scm,
            working_directory: self.scm.working_directory.clone(),
            release_label: self.scm.release_label.clone(),
        })
    }

    /// Settings for the tag driver
    pub fn tag_settings(&self) -> TagSettings {
        TagSettings {
            release_label: self.scm.release_label.clone(),
            comment_prefix: self.scm.comment_prefix.clone(),
            remote_tagging: self.scm.remote_tagging,
            revision: self.scm.revision.clone(),
            wait_before_tagging: self.scm.wait_before_tagging,
            working_directory: self.scm.working_directory.clone(),
            source_url: self.scm.source_url.clone(),
        }
    }
}

/// Loads the release plan from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `pomrelease.toml` in current directory
/// 3. `~/.config/.pomrelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// Relative paths inside a loaded file are resolved against the file's directory.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(ReleaseConfig)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<ReleaseConfig> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new("./pomrelease.toml").exists() {
        PathBuf::from("./pomrelease.toml")
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".pomrelease.toml");
        if config_path.exists() {
            config_path
        } else {
            return Ok(ReleaseConfig::default());
        }
    } else {
        return Ok(ReleaseConfig::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let config: ReleaseConfig = toml::from_str(&config_str)?;
    tracing::debug!("Loaded configuration from {}", path.display());

    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(config.rebase(base))
}
