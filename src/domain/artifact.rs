use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};

/// Group used for plugins declared without one
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Versionless artifact identifier, rendered as `groupId:artifactId`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
}

impl ArtifactKey {
    /// Create a key from its coordinates
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        ArtifactKey {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for ArtifactKey {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((group, artifact))
                if !group.trim().is_empty()
                    && !artifact.trim().is_empty()
                    && !artifact.contains(':') =>
            {
                Ok(ArtifactKey::new(group.trim(), artifact.trim()))
            }
            _ => Err(ReleaseError::config(format!(
                "Invalid artifact key '{}', expected 'groupId:artifactId'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for ArtifactKey {
    type Error = ReleaseError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ArtifactKey> for String {
    fn from(key: ArtifactKey) -> Self {
        key.to_string()
    }
}

/// Version per artifact for one run
pub type VersionMap = HashMap<ArtifactKey, String>;

/// An out-of-reactor snapshot dependency resolved before the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSnapshot {
    /// Version to write
    pub mapped: String,
    /// Version found in the descriptors
    pub original: String,
}

/// Resolved snapshot dependencies by artifact
pub type ResolvedSnapshots = HashMap<ArtifactKey, ResolvedSnapshot>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let key = ArtifactKey::new("com.example", "core");
        assert_eq!(key.to_string(), "com.example:core");
        assert_eq!("com.example:core".parse::<ArtifactKey>().unwrap(), key);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["core", ":core", "com.example:", "a:b:c"] {
            assert!(bad.parse::<ArtifactKey>().is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_deserialize_map_keys() {
        #[derive(Deserialize)]
        struct Plan {
            versions: HashMap<ArtifactKey, String>,
        }

        let plan: Plan = toml::from_str("[versions]\n\"g:a\" = \"1.0\"\n").unwrap();
        assert_eq!(
            plan.versions.get(&ArtifactKey::new("g", "a")).map(String::as_str),
            Some("1.0")
        );
    }
}
