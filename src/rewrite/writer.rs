use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::scm::ScmProvider;
use crate::xml::{Document, Element};

const POM_NAMESPACE_BASE: &str = "http://maven.apache.org/POM/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Namespace of descriptors with the given model version
pub fn pom_namespace(model_version: &str) -> String {
    format!("{}{}", POM_NAMESPACE_BASE, model_version)
}

/// Schema location of descriptors with the given model version
pub fn schema_location(model_version: &str) -> String {
    format!(
        "{} http://maven.apache.org/maven-v{}.xsd",
        pom_namespace(model_version),
        model_version.replace('.', "_")
    )
}

/// Put the root in the POM namespace and declare its schema.
///
/// An existing `xsi:schemaLocation` is kept. Descendants that reset the
/// default namespace with `xmlns=""` lose that override.
pub fn annotate_schema(root: &mut Element, model_version: &str) {
    root.set_attribute("xmlns", &pom_namespace(model_version));
    if root.attribute("xmlns:xsi").as_deref() != Some(XSI_NAMESPACE) {
        root.set_attribute("xmlns:xsi", XSI_NAMESPACE);
    }
    if !root.has_attribute("xsi:schemaLocation") {
        root.set_attribute("xsi:schemaLocation", &schema_location(model_version));
    }

    let mut is_root = true;
    root.for_each_element_mut(&mut |element| {
        if is_root {
            is_root = false;
            return;
        }
        if element.attribute("xmlns").as_deref() == Some("") {
            element.remove_attribute("xmlns");
        }
    });
}

/// Write intro, root and outro to `path`
pub fn write_document(path: &Path, document: &Document) -> Result<()> {
    let file = File::create(path).map_err(|e| ReleaseError::descriptor(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(document.to_xml_string().as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ReleaseError::descriptor(path, e))
}

/// Ask the provider to make `path` writable
pub fn request_edit(provider: &dyn ScmProvider, working_dir: &Path, path: &Path) -> Result<()> {
    let result = provider.enable_edit(working_dir, path).map_err(|e| {
        ReleaseError::scm(format!("An error occurred enabling edit mode: {}", e))
    })?;
    if !result.success {
        return Err(ReleaseError::scm(format!(
            "Unable to enable editing on {}: {}",
            path.display(),
            result.message
        )));
    }
    Ok(())
}
