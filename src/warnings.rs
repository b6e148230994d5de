use std::fmt;

/// Version references left alone while rewriting a module.
/// These are non-fatal and are reported once the run completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteWarning {
    /// `${name}` refers to a property the module does not declare
    UnresolvedProperty { module: String, expression: String },
    /// The property behind an expression already holds the target version
    AlreadyUpdated { module: String, expression: String },
    /// The expression is left for the build tool to resolve
    IgnoredExpression { module: String, expression: String },
    /// Dependency updates are disabled and the reference is a release
    KeptRelease {
        module: String,
        artifact: String,
        version: String,
    },
}

impl RewriteWarning {
    /// Display name of the module the warning was raised in
    pub fn module(&self) -> &str {
        match self {
            RewriteWarning::UnresolvedProperty { module, .. }
            | RewriteWarning::AlreadyUpdated { module, .. }
            | RewriteWarning::IgnoredExpression { module, .. }
            | RewriteWarning::KeptRelease { module, .. } => module,
        }
    }
}

impl fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteWarning::UnresolvedProperty { module, expression } => {
                write!(
                    f,
                    "The version could not be updated: {} (in '{}')",
                    expression, module
                )
            }
            RewriteWarning::AlreadyUpdated { module, expression } => {
                write!(
                    f,
                    "Ignoring artifact version update for expression {} because it is already updated (in '{}')",
                    expression, module
                )
            }
            RewriteWarning::IgnoredExpression { module, expression } => {
                write!(
                    f,
                    "Ignoring artifact version update for expression {} (in '{}')",
                    expression, module
                )
            }
            RewriteWarning::KeptRelease {
                module,
                artifact,
                version,
            } => {
                write!(
                    f,
                    "Keeping release {} of {} because dependency updates are disabled (in '{}')",
                    version, artifact, module
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_expression_and_module() {
        let warning = RewriteWarning::UnresolvedProperty {
            module: "core".to_string(),
            expression: "${lib.version}".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.contains("${lib.version}"));
        assert!(msg.contains("core"));
        assert_eq!(warning.module(), "core");
    }

    #[test]
    fn test_already_updated_display() {
        let warning = RewriteWarning::AlreadyUpdated {
            module: "web".to_string(),
            expression: "${shared.version}".to_string(),
        };
        assert!(warning.to_string().contains("already updated"));
    }
}
