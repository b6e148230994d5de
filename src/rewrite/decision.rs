//! Decision table for a single dependency, plugin or extension version
//!
//! [`decide`] is pure: it looks at the reference's literal, the version maps
//! and the current value of a referenced property, and says what to change.
//! Applying the decision is left to the caller.

/// State of the property an expression points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyLookup {
    /// The module has no `<properties>` block
    NoBlock,
    /// The block exists but does not declare the property
    Missing,
    /// Current trimmed value of the property
    Value(String),
}

/// Everything known about one version reference
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFacts<'a> {
    /// Trimmed text of the `<version>` element
    pub raw: &'a str,
    /// Target version of the referenced artifact
    pub mapped: Option<&'a str>,
    /// Version being replaced, from the original map or the resolved table
    pub original: Option<&'a str>,
    /// Resolved snapshot version of an out-of-reactor artifact
    pub resolved: Option<&'a str>,
    /// Target version of the module holding the reference
    pub module_mapped: Option<&'a str>,
    pub update_dependencies: bool,
}

/// What to do with a version reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionDecision {
    /// The reference is not part of this run
    Untouched,
    /// Updates are disabled and the literal is already a release
    KeepRelease,
    /// Replace the `<version>` text
    RewriteVersion(String),
    /// Replace the value of the property behind the expression
    RewriteProperty { name: String, value: String },
    /// The property already holds the target
    AlreadyUpdated { expression: String },
    /// The expression is left as written
    IgnoreExpression { expression: String },
    /// The expression names a property the module does not declare
    Unresolvable { expression: String },
    /// The property holds a version that is neither the original nor the target
    Conflict {
        property: String,
        found: String,
        required: String,
    },
}

/// Expressions the build tool resolves itself
pub fn is_reserved_expression(expression: &str) -> bool {
    expression.starts_with("project.") || expression.starts_with("pom.") || expression == "version"
}

/// Inner name of a whole-value `${...}` reference
pub fn expression_name(raw: &str) -> Option<&str> {
    raw.strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|inner| !inner.is_empty())
}

fn is_reserved_reference(value: &str) -> bool {
    expression_name(value)
        .map(|inner| {
            (inner.starts_with("project") && inner.len() > "project".len())
                || (inner.starts_with("pom") && inner.len() > "pom".len())
                || inner == "version"
        })
        .unwrap_or(false)
}

/// Decide how to update one version reference.
///
/// `property` is only consulted for a non-reserved `${name}` literal.
pub fn decide<F>(facts: &ReferenceFacts<'_>, property: F) -> VersionDecision
where
    F: FnOnce(&str) -> PropertyLookup,
{
    let Some(mapped) = facts.mapped else {
        return match facts.resolved {
            Some(resolved) => VersionDecision::RewriteVersion(resolved.to_string()),
            None => VersionDecision::Untouched,
        };
    };

    if mapped.ends_with(crate::version::SNAPSHOT_MARKER)
        && !facts.raw.ends_with(crate::version::SNAPSHOT_MARKER)
        && !facts.update_dependencies
    {
        return VersionDecision::KeepRelease;
    }

    if Some(facts.raw) == facts.original {
        return VersionDecision::RewriteVersion(mapped.to_string());
    }

    let Some(name) = expression_name(facts.raw) else {
        return VersionDecision::Untouched;
    };

    if is_reserved_expression(name) {
        return if Some(mapped) != facts.module_mapped {
            VersionDecision::RewriteVersion(mapped.to_string())
        } else {
            VersionDecision::IgnoreExpression {
                expression: facts.raw.to_string(),
            }
        };
    }

    let value = match property(name) {
        PropertyLookup::NoBlock | PropertyLookup::Missing => {
            return VersionDecision::Unresolvable {
                expression: facts.raw.to_string(),
            }
        }
        PropertyLookup::Value(value) => value,
    };

    if Some(value.as_str()) == facts.original {
        VersionDecision::RewriteProperty {
            name: name.to_string(),
            value: mapped.to_string(),
        }
    } else if mapped == value {
        VersionDecision::AlreadyUpdated {
            expression: facts.raw.to_string(),
        }
    } else if mapped == facts.raw {
        VersionDecision::Untouched
    } else if is_reserved_reference(mapped) {
        VersionDecision::IgnoreExpression {
            expression: mapped.to_string(),
        }
    } else {
        VersionDecision::Conflict {
            property: name.to_string(),
            found: value,
            required: mapped.to_string(),
        }
    }
}
