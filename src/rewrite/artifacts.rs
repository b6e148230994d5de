//! Second pass: rewrite one module's descriptor tree

use super::context::{PropertyVersions, VersionTables};
use super::decision::{decide, PropertyLookup, ReferenceFacts, VersionDecision};
use crate::domain::{ArtifactKey, Module, Reactor, RewriteMode, DEFAULT_PLUGIN_GROUP};
use crate::error::{ReleaseError, Result};
use crate::version;
use crate::warnings::RewriteWarning;
use crate::xml::{Element, NodePath};

/// Element lists holding version references, relative to a module or profile
const REFERENCE_LISTS: &[&[&str]] = &[
    &["dependencies", "dependency"],
    &["dependencyManagement", "dependencies", "dependency"],
    &["build", "extensions", "extension"],
];

const PLUGIN_LISTS: &[&[&str]] = &[
    &["build", "plugins", "plugin"],
    &["build", "pluginManagement", "plugins", "plugin"],
];

const REPORTING_PLUGINS: &[&str] = &["reporting", "plugins", "plugin"];

/// Rewrite `<parent><version>`.
///
/// Returns the version written, or `None` when the module has no parent or
/// the parent is outside the run.
pub fn rewrite_parent(
    module: &Module,
    root: &mut Element,
    tables: &VersionTables<'_>,
    reactor: &Reactor,
    mode: RewriteMode,
) -> Result<Option<String>> {
    let Some(parent) = &module.parent else {
        return Ok(None);
    };

    let Some(target) = tables.target(&parent.key) else {
        // Still pointing at the version the run started from, so a target was expected
        if tables.original.get(&parent.key) == Some(&parent.version) {
            let name = reactor
                .find(&parent.key)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| parent.key.to_string());
            return Err(ReleaseError::UnmappedParent(name));
        }
        tracing::debug!("Parent {} is not part of the run", parent.key);
        return Ok(None);
    };

    let value = if mode == RewriteMode::Next && version::is_snapshot(target) {
        version::decrement_snapshot(target)?
    } else {
        target.to_string()
    };

    if let Some(element) = root
        .child_mut("parent")
        .and_then(|parent| parent.child_mut("version"))
    {
        element.rewrite_value(&value);
    }
    Ok(Some(value))
}

/// Rewrite the module's own `<version>`, inserting one when it was inherited
/// and the target differs from the parent's.
pub fn rewrite_version(
    module: &Module,
    root: &mut Element,
    tables: &VersionTables<'_>,
    mode: RewriteMode,
    parent_version: Option<&str>,
    ls: &str,
) -> Result<()> {
    let target = tables
        .mapped
        .get(&module.key)
        .ok_or_else(|| ReleaseError::UnmappedVersion(module.name.clone()))?;

    match root.child_mut("version") {
        Some(element) => {
            let value = if mode == RewriteMode::Next {
                version::decrement_snapshot(target)?
            } else {
                target.clone()
            };
            element.rewrite_value(&value);
        }
        None => {
            if mode != RewriteMode::Next && Some(target.as_str()) != parent_version {
                if let Some(index) = root.child_position("artifactId") {
                    root.insert_after(index, Element::with_text("version", target), ls);
                }
            }
        }
    }
    Ok(())
}

/// Write the run's values into every snapshot property the module declares.
///
/// Returns the number of properties rewritten.
pub fn rewrite_properties(
    root: &mut Element,
    versions: &PropertyVersions,
    mode: RewriteMode,
) -> usize {
    let Some(block) = root.child_mut("properties") else {
        return 0;
    };

    let names: Vec<String> = block
        .elements()
        .map(|e| e.local_name().to_string())
        .filter(|name| versions.contains(name))
        .collect();

    let mut rewritten = 0;
    for name in names {
        let value = match mode {
            RewriteMode::Tag => versions.release_value(&name),
            _ => versions.next_value(&name),
        };
        if let (Some(value), Some(property)) = (value, block.child_mut(&name)) {
            property.rewrite_value(value);
            rewritten += 1;
        }
    }
    rewritten
}

/// Settings shared by every reference of one module
#[derive(Debug, Clone, Copy)]
pub struct ReferenceScope<'a> {
    pub module: &'a Module,
    pub tables: VersionTables<'a>,
    pub update_dependencies: bool,
}

/// Rewrite every dependency, plugin and extension version of the module and
/// its profiles
pub fn rewrite_artifact_versions(
    root: &mut Element,
    scope: &ReferenceScope<'_>,
    warnings: &mut Vec<RewriteWarning>,
) -> Result<()> {
    for path in reference_paths(root) {
        rewrite_reference(root, &path, scope, warnings)?;
    }
    Ok(())
}

/// Paths of all version-carrying elements in visiting order
fn reference_paths(root: &Element) -> Vec<NodePath> {
    let mut scopes = vec![NodePath::new()];
    scopes.extend(root.find_paths(&["profiles", "profile"]));

    let mut paths = Vec::new();
    for scope in scopes {
        let Some(base) = root.descendant(&scope) else {
            continue;
        };
        let prefixed = |relative: Vec<NodePath>| -> Vec<NodePath> {
            relative
                .into_iter()
                .map(|p| scope.iter().copied().chain(p).collect())
                .collect()
        };

        for names in REFERENCE_LISTS {
            paths.extend(prefixed(base.find_paths(names)));
        }

        let plugins: Vec<NodePath> = PLUGIN_LISTS
            .iter()
            .flat_map(|names| prefixed(base.find_paths(names)))
            .collect();
        paths.extend(plugins.iter().cloned());
        for plugin in &plugins {
            if let Some(element) = root.descendant(plugin) {
                let deps = element.find_paths(&["dependencies", "dependency"]);
                paths.extend(
                    deps.into_iter()
                        .map(|p| plugin.iter().copied().chain(p).collect::<NodePath>()),
                );
            }
        }

        paths.extend(prefixed(base.find_paths(REPORTING_PLUGINS)));
    }
    paths
}

fn rewrite_reference(
    root: &mut Element,
    path: &[usize],
    scope: &ReferenceScope<'_>,
    warnings: &mut Vec<RewriteWarning>,
) -> Result<()> {
    let module = scope.module;

    let (key, artifact_id, decision) = {
        let Some(element) = root.descendant(path) else {
            return Ok(());
        };
        let Some(version_element) = element.child("version") else {
            return Ok(());
        };
        let raw = version_element.text_trim();

        let group_id = match element.child_text("groupId") {
            Some(group) => group,
            None if element.local_name() == "plugin" => DEFAULT_PLUGIN_GROUP.to_string(),
            None => return Ok(()),
        };
        let Some(artifact_id) = element.child_text("artifactId") else {
            return Ok(());
        };
        let key = ArtifactKey::new(module.interpolate(&group_id), module.interpolate(&artifact_id));

        let facts = ReferenceFacts {
            raw: &raw,
            mapped: scope.tables.mapped.get(&key).map(String::as_str),
            original: scope.tables.original(&key),
            resolved: scope.tables.resolved(&key),
            module_mapped: scope.tables.mapped.get(&module.key).map(String::as_str),
            update_dependencies: scope.update_dependencies,
        };
        let decision = decide(&facts, |name| lookup_property(root, name));
        (key, artifact_id, decision)
    };

    tracing::debug!("{} in '{}': {:?}", key, module.name, decision);

    match decision {
        VersionDecision::Untouched => {}
        VersionDecision::RewriteVersion(value) => {
            if let Some(version) = root
                .descendant_mut(path)
                .and_then(|element| element.child_mut("version"))
            {
                tracing::info!("  Updating {} to {}", artifact_id, value);
                version.rewrite_value(&value);
            }
        }
        VersionDecision::RewriteProperty { name, value } => {
            if let Some(property) = root
                .child_mut("properties")
                .and_then(|block| block.child_mut(&name))
            {
                tracing::info!("  Updating ${{{}}} to {}", name, value);
                property.rewrite_value(&value);
            }
        }
        VersionDecision::KeepRelease => {
            let raw = root
                .descendant(path)
                .and_then(|e| e.child_text("version"))
                .unwrap_or_default();
            warnings.push(RewriteWarning::KeptRelease {
                module: module.name.clone(),
                artifact: key.to_string(),
                version: raw,
            });
        }
        VersionDecision::AlreadyUpdated { expression } => {
            warnings.push(RewriteWarning::AlreadyUpdated {
                module: module.name.clone(),
                expression,
            });
        }
        VersionDecision::IgnoreExpression { expression } => {
            warnings.push(RewriteWarning::IgnoredExpression {
                module: module.name.clone(),
                expression,
            });
        }
        VersionDecision::Unresolvable { expression } => {
            warnings.push(RewriteWarning::UnresolvedProperty {
                module: module.name.clone(),
                expression,
            });
        }
        VersionDecision::Conflict {
            property,
            found,
            required,
        } => {
            return Err(ReleaseError::conflict(format!(
                "The artifact ({}) requires a different version ({}) than what is found ({}) \
                 for the expression ({}) in the project ({}).",
                key, required, found, property, module.key
            )));
        }
    }
    Ok(())
}

fn lookup_property(root: &Element, name: &str) -> PropertyLookup {
    match root.child("properties") {
        None => PropertyLookup::NoBlock,
        Some(block) => match block.child(name) {
            Some(property) => PropertyLookup::Value(property.text_trim()),
            None => PropertyLookup::Missing,
        },
    }
}
