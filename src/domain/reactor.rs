use std::path::{Component, Path, PathBuf};

use super::artifact::{ArtifactKey, VersionMap};
use super::module::Module;
use crate::error::Result;

/// Modules taking part in one run, in build order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reactor {
    modules: Vec<Module>,
}

impl Reactor {
    pub fn new(modules: Vec<Module>) -> Self {
        Reactor { modules }
    }

    /// Load every descriptor in the given order
    pub fn load<P: AsRef<Path>>(paths: &[P], ls: &str) -> Result<Self> {
        let modules = paths
            .iter()
            .map(|path| Module::load(path.as_ref(), ls))
            .collect::<Result<Vec<_>>>()?;
        Ok(Reactor { modules })
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn find(&self, key: &ArtifactKey) -> Option<&Module> {
        self.modules.iter().find(|m| &m.key == key)
    }

    /// Pre-run version of every module
    pub fn versions(&self) -> VersionMap {
        self.modules
            .iter()
            .map(|m| (m.key.clone(), m.version.clone()))
            .collect()
    }

    /// Deepest directory containing every module directory
    pub fn common_basedir(&self) -> Option<PathBuf> {
        let mut dirs = self.modules.iter().map(Module::directory);
        let first: Vec<Component<'_>> = dirs.next()?.components().collect();

        let common = dirs.fold(first, |common, dir| {
            common
                .into_iter()
                .zip(dir.components())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect()
        });

        if common.is_empty() {
            None
        } else {
            Some(common.iter().collect())
        }
    }
}

impl<'a> IntoIterator for &'a Reactor {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}
