//! Format-preserving descriptor documents
//!
//! A [`Document`] is the root element plus the raw text before it (intro) and
//! after it (outro). Writing an unmodified document reproduces the normalized
//! input byte for byte.

mod element;
pub mod prolog;

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ReleaseError, Result};

pub use element::{local_name, Element, Node, NodePath};

/// A parsed descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
    pub intro: String,
    pub outro: String,
}

impl Document {
    /// Read and parse a descriptor file
    pub fn load(path: &Path, ls: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReleaseError::descriptor(path, e))?;
        Document::parse(&content, ls).map_err(|e| match e {
            ReleaseError::Xml(message) => ReleaseError::descriptor(path, message),
            other => other,
        })
    }

    /// Parse descriptor text
    ///
    /// Line endings are normalized to `ls` and tag spacing is normalized
    /// before parsing.
    pub fn parse(content: &str, ls: &str) -> Result<Self> {
        let normalized = prolog::normalize_line_endings(content, ls);
        let normalized = prolog::normalize_tag_spacing(&normalized);

        let mut root = parse_root(&normalized)?;
        root.normalize_line_endings(ls);

        let (intro, outro) = prolog::split_around_root(&normalized, &root.serialize());
        Ok(Document { root, intro, outro })
    }

    /// Full document text: intro, root and outro
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(self.intro.len() + self.outro.len());
        out.push_str(&self.intro);
        out.push_str(&self.root.serialize());
        out.push_str(&self.outro);
        out
    }
}

fn parse_root(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            ReleaseError::xml(format!("{} at position {}", e, reader.buffer_position()))
        })?;
        let end = reader.buffer_position() as usize;
        let raw = &content[start..end];

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::from_raw(name, raw));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::from_raw(name, raw))?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| ReleaseError::xml(format!("unexpected end tag '{}'", raw)))?;
                element.close(raw);
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(_) | Event::GeneralRef(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_raw_text(raw);
                }
            }
            Event::CData(_) => {
                if let Some(parent) = stack.last_mut() {
                    let inner = raw
                        .strip_prefix("<![CDATA[")
                        .and_then(|s| s.strip_suffix("]]>"))
                        .unwrap_or(raw);
                    parent.push_parsed(Node::CData(inner.to_string()));
                }
            }
            Event::Comment(_) => {
                if let Some(parent) = stack.last_mut() {
                    let inner = raw
                        .strip_prefix("<!--")
                        .and_then(|s| s.strip_suffix("-->"))
                        .unwrap_or(raw);
                    parent.push_parsed(Node::Comment(inner.to_string()));
                }
            }
            Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_parsed(Node::Raw(raw.to_string()));
                }
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(ReleaseError::xml(format!(
            "element '{}' is never closed",
            open.name()
        )));
    }
    root.ok_or_else(|| ReleaseError::xml("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_parsed(Node::Element(element));
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(ReleaseError::xml(format!(
            "unexpected second root element '{}'",
            element.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- licensed -->
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <modelVersion>4.0.0</modelVersion>

  <groupId>com.example</groupId>   <!-- group -->
  <artifactId>app</artifactId>
  <version>1.0-SNAPSHOT</version>
  <description><![CDATA[a < b]]> &amp; more</description>
  <properties>
    <empty />
  </properties>
</project>
<!-- trailing -->
"#;

    #[test]
    fn test_roundtrip_is_byte_identical() {
        let doc = Document::parse(SAMPLE, "\n").unwrap();
        assert_eq!(doc.to_xml_string(), SAMPLE);
        assert_eq!(doc.intro, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- licensed -->\n");
        assert_eq!(doc.outro, "\n<!-- trailing -->\n");
    }

    #[test]
    fn test_text_reads_cdata_and_entities() {
        let doc = Document::parse(SAMPLE, "\n").unwrap();
        assert_eq!(doc.root.child_text("description").as_deref(), Some("a < b & more"));
    }

    #[test]
    fn test_crlf_input_normalized() {
        let doc = Document::parse("<a>\r\n  <b>1</b>\r\n</a>\r\n", "\n").unwrap();
        assert_eq!(doc.to_xml_string(), "<a>\n  <b>1</b>\n</a>\n");

        let doc = Document::parse("<a>\n<!-- x\ny -->\n</a>", "\r\n").unwrap();
        assert_eq!(doc.to_xml_string(), "<a>\r\n<!-- x\r\ny -->\r\n</a>");
    }

    #[test]
    fn test_single_edit_changes_only_that_region() {
        let mut doc = Document::parse(SAMPLE, "\n").unwrap();
        doc.root.child_mut("version").unwrap().rewrite_value("1.0");
        let expected = SAMPLE.replace("<version>1.0-SNAPSHOT</version>", "<version>1.0</version>");
        assert_eq!(doc.to_xml_string(), expected);
    }

    #[test]
    fn test_malformed_documents_fail() {
        assert!(matches!(
            Document::parse("<a><b></a>", "\n"),
            Err(ReleaseError::Xml(_))
        ));
        assert!(Document::parse("<a>", "\n").is_err());
        assert!(Document::parse("   ", "\n").is_err());
    }

    #[test]
    fn test_load_reports_descriptor_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pom.xml");
        std::fs::write(&path, "<project><version></project>").unwrap();
        let err = Document::load(&path, "\n").unwrap_err();
        assert!(matches!(err, ReleaseError::Descriptor { .. }));
        assert!(err.to_string().contains("pom.xml"));
    }
}
