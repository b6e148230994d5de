use crate::domain::Module;
use crate::error::Result;
use crate::xml::Element;

/// Element names in `<scm>` holding repository locations
const SCM_LOCATIONS: &[&str] = &["connection", "developerConnection", "url"];

/// Run information handed to an [`ScmTransform`]
#[derive(Debug, Clone, Copy)]
pub struct ScmContext<'a> {
    pub release_label: Option<&'a str>,
    pub ls: &'a str,
}

/// Last step of rewriting a module: adjust its `<scm>` block
pub trait ScmTransform: Send + Sync {
    fn transform(&self, module: &Module, root: &mut Element, context: &ScmContext<'_>) -> Result<()>;
}

/// Leaves the SCM block untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScmTransform;

impl ScmTransform for NoopScmTransform {
    fn transform(&self, _module: &Module, _root: &mut Element, _context: &ScmContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Points `<scm><tag>` at a release label and optionally moves repository
/// locations from the trunk base to the tag base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScmTagTransform {
    /// Value written to `<tag>`, the run's release label when absent
    pub tag: Option<String>,
    pub trunk_base: Option<String>,
    pub tag_base: Option<String>,
}

impl ScmTagTransform {
    /// Write the run's release label
    pub fn release() -> Self {
        Self::default()
    }

    /// Write a fixed tag value, e.g. `HEAD` for development versions
    pub fn fixed(tag: impl Into<String>) -> Self {
        ScmTagTransform {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }

    /// Translate locations from `trunk_base` to `tag_base`
    pub fn with_translation(mut self, trunk_base: impl Into<String>, tag_base: impl Into<String>) -> Self {
        self.trunk_base = Some(trunk_base.into());
        self.tag_base = Some(tag_base.into());
        self
    }
}

impl ScmTransform for ScmTagTransform {
    fn transform(&self, module: &Module, root: &mut Element, context: &ScmContext<'_>) -> Result<()> {
        let Some(scm) = root.child_mut("scm") else {
            return Ok(());
        };

        if let Some(tag) = self.tag.as_deref().or(context.release_label) {
            tracing::info!("  Setting SCM tag of '{}' to {}", module.name, tag);
            scm.rewrite_element("tag", Some(tag), context.ls);
        }

        if let (Some(trunk), Some(tag_base)) = (&self.trunk_base, &self.tag_base) {
            for name in SCM_LOCATIONS {
                let Some(current) = scm.child_text(name) else {
                    continue;
                };
                let translated = translate_url_path(trunk, tag_base, &current);
                if translated != current {
                    scm.rewrite_element(name, Some(&translated), context.ls);
                }
            }
        }
        Ok(())
    }
}

/// Move `url_path` from the trunk location to the tag location.
///
/// The part of `trunk_path` after its common prefix with `tag_path` is
/// replaced by the matching part of `tag_path`. When the URL does not contain
/// it, the tag path is returned as is.
///
/// ```
/// # use pom_release::rewrite::translate_url_path;
/// assert_eq!(
///     translate_url_path(
///         "scm:svn:http://host/repo/trunk",
///         "scm:svn:http://host/repo/tags/1.0",
///         "scm:svn:http://host/repo/trunk/core",
///     ),
///     "scm:svn:http://host/repo/tags/1.0/core"
/// );
/// ```
pub fn translate_url_path(trunk_path: &str, tag_path: &str, url_path: &str) -> String {
    let trunk = trunk_path.trim();
    let tag = tag_path.trim();
    let trunk = trunk.strip_suffix('/').unwrap_or(trunk);
    let tag = tag.strip_suffix('/').unwrap_or(tag);

    let common = trunk
        .char_indices()
        .zip(tag.chars())
        .find(|((_, a), b)| a != b)
        .map(|((index, _), _)| index)
        .unwrap_or_else(|| trunk.len().min(tag.len()));

    let trunk_rest = &trunk[common..];
    if common == 0 {
        return tag.to_string();
    }
    if trunk_rest.is_empty() {
        return url_path.to_string();
    }
    if url_path.contains(trunk_rest) {
        url_path.replace(trunk_rest, &tag[common..])
    } else {
        tag.to_string()
    }
}
