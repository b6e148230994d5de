use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::artifact::ArtifactKey;
use crate::error::{ReleaseError, Result};
use crate::xml::{Document, Element};

/// Default model version when a descriptor declares none
pub const DEFAULT_MODEL_VERSION: &str = "4.0.0";

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("hardcoded regex must compile"));

/// Nested expressions are resolved at most this many times
const MAX_INTERPOLATION_DEPTH: usize = 8;

/// Parent block of a module descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub key: ArtifactKey,
    pub version: String,
}

/// SCM block of a module descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScmInfo {
    pub connection: Option<String>,
    pub developer_connection: Option<String>,
    pub url: Option<String>,
    pub tag: Option<String>,
}

/// One module of the reactor as read before the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub key: ArtifactKey,
    pub name: String,
    /// Version before the run, inherited from the parent when not declared
    pub version: String,
    pub parent: Option<ParentRef>,
    pub descriptor: PathBuf,
    /// Declared properties in document order
    pub properties: Vec<(String, String)>,
    pub packaging: String,
    pub model_version: String,
    pub scm: Option<ScmInfo>,
}

impl Module {
    /// Read a module from its descriptor file
    pub fn load(path: &Path, ls: &str) -> Result<Self> {
        let document = Document::load(path, ls)?;
        Module::from_root(path, &document.root)
    }

    /// Build a module from an already parsed descriptor root
    pub fn from_root(path: &Path, root: &Element) -> Result<Self> {
        let parent = match root.child("parent") {
            Some(parent) => Some(ParentRef {
                key: ArtifactKey::new(
                    required(path, parent, "groupId", "parent groupId")?,
                    required(path, parent, "artifactId", "parent artifactId")?,
                ),
                version: required(path, parent, "version", "parent version")?,
            }),
            None => None,
        };

        let artifact_id = required(path, root, "artifactId", "artifactId")?;
        let group_id = match (root.child_text("groupId"), &parent) {
            (Some(group), _) => group,
            (None, Some(parent)) => parent.key.group_id.clone(),
            (None, None) => {
                return Err(ReleaseError::descriptor(path, "missing groupId and no parent"))
            }
        };
        let version = match (root.child_text("version"), &parent) {
            (Some(version), _) => version,
            (None, Some(parent)) => parent.version.clone(),
            (None, None) => {
                return Err(ReleaseError::descriptor(path, "missing version and no parent"))
            }
        };

        let properties = root
            .child("properties")
            .map(|block| {
                block
                    .elements()
                    .map(|p| (p.local_name().to_string(), p.text_trim()))
                    .collect()
            })
            .unwrap_or_default();

        let scm = root.child("scm").map(|scm| ScmInfo {
            connection: scm.child_text("connection"),
            developer_connection: scm.child_text("developerConnection"),
            url: scm.child_text("url"),
            tag: scm.child_text("tag"),
        });

        Ok(Module {
            name: root
                .child_text("name")
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| artifact_id.clone()),
            key: ArtifactKey::new(group_id, artifact_id),
            version,
            parent,
            descriptor: path.to_path_buf(),
            properties,
            packaging: root
                .child_text("packaging")
                .unwrap_or_else(|| "jar".to_string()),
            model_version: root
                .child_text("modelVersion")
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            scm,
        })
    }

    /// Directory holding the descriptor
    pub fn directory(&self) -> &Path {
        match self.descriptor.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Value of a declared property
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Path of the side file written when simulating with `suffix`
    pub fn side_file(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .descriptor
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "pom.xml".into());
        name.push(".");
        name.push(suffix);
        self.descriptor.with_file_name(name)
    }

    /// Resolve `${...}` expressions against the module's coordinates and
    /// declared properties. Unknown expressions are left as written.
    ///
    /// ```
    /// # use std::path::Path;
    /// # use pom_release::domain::Module;
    /// # use pom_release::xml::Document;
    /// let doc = Document::parse(
    ///     "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>\
    ///      <properties><suffix>-core</suffix></properties></project>",
    ///     "\n",
    /// ).unwrap();
    /// let module = Module::from_root(Path::new("pom.xml"), &doc.root).unwrap();
    /// assert_eq!(module.interpolate("${project.artifactId}${suffix}"), "a-core");
    /// assert_eq!(module.interpolate("${unknown}"), "${unknown}");
    /// ```
    pub fn interpolate(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..MAX_INTERPOLATION_DEPTH {
            let next = EXPRESSION
                .replace_all(&current, |caps: &Captures| {
                    self.resolve_expression(&caps[1])
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn resolve_expression(&self, expression: &str) -> Option<String> {
        let field = expression
            .strip_prefix("project.")
            .or_else(|| expression.strip_prefix("pom."));

        if let Some(field) = field {
            let value = match field {
                "groupId" => Some(self.key.group_id.clone()),
                "artifactId" => Some(self.key.artifact_id.clone()),
                "version" => Some(self.version.clone()),
                "packaging" => Some(self.packaging.clone()),
                "name" => Some(self.name.clone()),
                "parent.groupId" => self.parent.as_ref().map(|p| p.key.group_id.clone()),
                "parent.artifactId" => self.parent.as_ref().map(|p| p.key.artifact_id.clone()),
                "parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
                _ => None,
            };
            if value.is_some() {
                return value;
            }
        }

        match expression {
            "groupId" => Some(self.key.group_id.clone()),
            "artifactId" => Some(self.key.artifact_id.clone()),
            "version" => Some(self.version.clone()),
            name => self.property(name).map(str::to_string),
        }
    }
}

fn required(path: &Path, element: &Element, child: &str, what: &str) -> Result<String> {
    element
        .child_text(child)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ReleaseError::descriptor(path, format!("missing {}", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(xml: &str) -> Result<Module> {
        let doc = Document::parse(xml, "\n").unwrap();
        Module::from_root(Path::new("/work/core/pom.xml"), &doc.root)
    }

    #[test]
    fn test_inherits_group_and_version_from_parent() {
        let m = module(
            "<project><parent><groupId>g</groupId><artifactId>root</artifactId>\
             <version>2.0-SNAPSHOT</version></parent><artifactId>core</artifactId></project>",
        )
        .unwrap();
        assert_eq!(m.key, ArtifactKey::new("g", "core"));
        assert_eq!(m.version, "2.0-SNAPSHOT");
        assert_eq!(m.parent.unwrap().key.artifact_id, "root");
        assert_eq!(m.name, "core");
        assert_eq!(m.packaging, "jar");
        assert_eq!(m.model_version, DEFAULT_MODEL_VERSION);
    }

    #[test]
    fn test_missing_coordinates_fail() {
        let err = module("<project><artifactId>a</artifactId><version>1</version></project>")
            .unwrap_err();
        assert!(err.to_string().contains("groupId"));
        assert!(module("<project><groupId>g</groupId><version>1</version></project>").is_err());
    }

    #[test]
    fn test_properties_keep_order() {
        let m = module(
            "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>\
             <properties><b> 2 </b><a>1</a></properties></project>",
        )
        .unwrap();
        assert_eq!(
            m.properties,
            vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
        );
        assert_eq!(m.property("b"), Some("2"));
        assert_eq!(m.property("c"), None);
    }

    #[test]
    fn test_interpolation_is_nested_and_bounded() {
        let m = module(
            "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>\
             <properties><x>${y}</x><y>${pom.groupId}</y><loop>${loop}</loop></properties></project>",
        )
        .unwrap();
        assert_eq!(m.interpolate("${x}:${project.version}"), "g:1");
        assert_eq!(m.interpolate("${loop}"), "${loop}");
    }

    #[test]
    fn test_side_file_and_directory() {
        let m = module("<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>")
            .unwrap();
        assert_eq!(m.side_file("next"), PathBuf::from("/work/core/pom.xml.next"));
        assert_eq!(m.directory(), Path::new("/work/core"));
    }

    #[test]
    fn test_scm_block() {
        let m = module(
            "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>\
             <scm><url>https://example.org/trunk</url><tag>HEAD</tag></scm></project>",
        )
        .unwrap();
        let scm = m.scm.unwrap();
        assert_eq!(scm.url.as_deref(), Some("https://example.org/trunk"));
        assert_eq!(scm.tag.as_deref(), Some("HEAD"));
        assert!(scm.connection.is_none());
    }
}
