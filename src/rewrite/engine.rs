use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::artifacts::{self, ReferenceScope};
use super::context::{PropertyVersions, VersionTables};
use super::properties;
use super::transform::{NoopScmTransform, ScmContext, ScmTransform};
use super::writer;
use crate::domain::{Module, Reactor, ResolvedSnapshots, RewriteMode, VersionMap};
use crate::error::Result;
use crate::scm::ScmProvider;
use crate::warnings::RewriteWarning;
use crate::xml::Document;

/// Source of a version map for one run
pub trait VersionMapProvider {
    fn version_map(&self, reactor: &Reactor, simulate: bool) -> Result<VersionMap>;
}

impl<F> VersionMapProvider for F
where
    F: Fn(&Reactor, bool) -> Result<VersionMap>,
{
    fn version_map(&self, reactor: &Reactor, simulate: bool) -> Result<VersionMap> {
        self(reactor, simulate)
    }
}

/// A fixed map, typically read from the release plan
#[derive(Debug, Clone, Default)]
pub struct StaticVersionMap(pub VersionMap);

impl VersionMapProvider for StaticVersionMap {
    fn version_map(&self, _reactor: &Reactor, _simulate: bool) -> Result<VersionMap> {
        Ok(self.0.clone())
    }
}

/// The versions the reactor's descriptors hold before the run
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactorVersions;

impl VersionMapProvider for ReactorVersions {
    fn version_map(&self, reactor: &Reactor, _simulate: bool) -> Result<VersionMap> {
        Ok(reactor.versions())
    }
}

/// Settings of the rewrite engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Line separator used for every descriptor
    pub ls: String,
    pub add_schema: bool,
    pub update_dependencies: bool,
    pub scm_use_edit_mode: bool,
    pub update_scm: bool,
    pub working_directory: PathBuf,
    pub release_label: Option<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            ls: default_line_separator().to_string(),
            add_schema: false,
            update_dependencies: true,
            scm_use_edit_mode: false,
            update_scm: true,
            working_directory: PathBuf::from("."),
            release_label: None,
        }
    }
}

/// Platform line separator
pub fn default_line_separator() -> &'static str {
    if cfg!(windows) {
        "\r\n"
    } else {
        "\n"
    }
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    pub mode: RewriteMode,
    pub simulated: bool,
    /// Files written, in reactor order
    pub written: Vec<PathBuf>,
    pub properties: usize,
    pub warnings: Vec<RewriteWarning>,
}

impl RewriteReport {
    fn new(mode: RewriteMode, simulated: bool) -> Self {
        RewriteReport {
            mode,
            simulated,
            written: Vec::new(),
            properties: 0,
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Two-pass rewrite of every descriptor in a reactor
pub struct RewriteEngine {
    mode: RewriteMode,
    options: RewriteOptions,
    next_versions: Box<dyn VersionMapProvider>,
    original_versions: Box<dyn VersionMapProvider>,
    resolved: ResolvedSnapshots,
    scm_transform: Box<dyn ScmTransform>,
    scm_provider: Option<Arc<dyn ScmProvider>>,
}

impl RewriteEngine {
    /// Engine with an empty target map, the reactor as original versions and
    /// no SCM integration
    pub fn new(mode: RewriteMode, options: RewriteOptions) -> Self {
        RewriteEngine {
            mode,
            options,
            next_versions: Box::new(StaticVersionMap::default()),
            original_versions: Box::new(ReactorVersions),
            resolved: ResolvedSnapshots::new(),
            scm_transform: Box::new(NoopScmTransform),
            scm_provider: None,
        }
    }

    pub fn with_next_versions(mut self, provider: impl VersionMapProvider + 'static) -> Self {
        self.next_versions = Box::new(provider);
        self
    }

    pub fn with_original_versions(mut self, provider: impl VersionMapProvider + 'static) -> Self {
        self.original_versions = Box::new(provider);
        self
    }

    pub fn with_resolved_snapshots(mut self, resolved: ResolvedSnapshots) -> Self {
        self.resolved = resolved;
        self
    }

    pub fn with_scm_transform(mut self, transform: impl ScmTransform + 'static) -> Self {
        self.scm_transform = Box::new(transform);
        self
    }

    pub fn with_scm_provider(mut self, provider: Arc<dyn ScmProvider>) -> Self {
        self.scm_provider = Some(provider);
        self
    }

    pub fn mode(&self) -> RewriteMode {
        self.mode
    }

    /// Rewrite every descriptor in place
    pub fn execute(&self, reactor: &Reactor) -> Result<RewriteReport> {
        self.transform(reactor, false)
    }

    /// Write every rewritten descriptor to a side file next to it
    pub fn simulate(&self, reactor: &Reactor) -> Result<RewriteReport> {
        self.transform(reactor, true)
    }

    /// Remove the side files a simulation left behind
    ///
    /// Returns the removed paths.
    pub fn clean(&self, reactor: &Reactor) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for module in reactor {
            let side_file = module.side_file(self.mode.suffix());
            if side_file.exists() {
                fs::remove_file(&side_file)?;
                tracing::debug!("Removed {}", side_file.display());
                removed.push(side_file);
            }
        }
        Ok(removed)
    }

    fn transform(&self, reactor: &Reactor, simulate: bool) -> Result<RewriteReport> {
        let mapped = self.next_versions.version_map(reactor, simulate)?;
        let original = self.original_versions.version_map(reactor, simulate)?;
        let tables = VersionTables {
            mapped: &mapped,
            original: &original,
            resolved: &self.resolved,
        };

        let property_versions = properties::scan_reactor(reactor)?;

        let mut report = RewriteReport::new(self.mode, simulate);
        report.properties = property_versions.len();

        for module in reactor {
            tracing::info!("Transforming '{}'...", module.name);
            let path = self.transform_module(
                module,
                reactor,
                &tables,
                &property_versions,
                simulate,
                &mut report.warnings,
            )?;
            report.written.push(path);
        }

        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }
        Ok(report)
    }

    fn transform_module(
        &self,
        module: &Module,
        reactor: &Reactor,
        tables: &VersionTables<'_>,
        property_versions: &PropertyVersions,
        simulate: bool,
        warnings: &mut Vec<RewriteWarning>,
    ) -> Result<PathBuf> {
        let ls = self.options.ls.as_str();
        let mut document = Document::load(&module.descriptor, ls)?;
        let root = &mut document.root;

        let parent_version = artifacts::rewrite_parent(module, root, tables, reactor, self.mode)?;
        artifacts::rewrite_version(module, root, tables, self.mode, parent_version.as_deref(), ls)?;
        artifacts::rewrite_properties(root, property_versions, self.mode);

        let scope = ReferenceScope {
            module,
            tables: *tables,
            update_dependencies: self.options.update_dependencies,
        };
        artifacts::rewrite_artifact_versions(root, &scope, warnings)?;

        if self.options.update_scm {
            let context = ScmContext {
                release_label: self.options.release_label.as_deref(),
                ls,
            };
            self.scm_transform.transform(module, root, &context)?;
        }

        if self.options.add_schema {
            writer::annotate_schema(root, &module.model_version);
        }

        let target = if simulate {
            module.side_file(self.mode.suffix())
        } else {
            self.prepare_in_place(&module.descriptor)?;
            module.descriptor.clone()
        };
        writer::write_document(&target, &document)?;
        Ok(target)
    }

    fn prepare_in_place(&self, path: &Path) -> Result<()> {
        if !self.options.update_scm {
            return Ok(());
        }
        let Some(provider) = &self.scm_provider else {
            return Ok(());
        };
        if self.options.scm_use_edit_mode || provider.requires_edit_mode() {
            writer::request_edit(provider.as_ref(), &self.options.working_directory, path)?;
        }
        Ok(())
    }
}
