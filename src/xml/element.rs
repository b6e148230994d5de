//! Editable element tree that keeps the raw source text of every node
//!
//! Untouched nodes serialize back to exactly the bytes they were parsed from.
//! Only the nodes an edit touches are re-rendered.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::{escape, partial_escape, unescape};
use regex::Regex;

use super::prolog::normalize_line_endings;

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/<>"']+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("hardcoded regex must compile")
});

/// Index path from an element down to one of its descendants.
pub type NodePath = Vec<usize>;

/// A node of the descriptor tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data exactly as written, entity references included
    Text(String),
    /// Content between `<![CDATA[` and `]]>`
    CData(String),
    /// Content between `<!--` and `-->`
    Comment(String),
    /// Any other markup kept verbatim (processing instructions)
    Raw(String),
}

impl Node {
    fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_to(out),
            Node::Text(text) | Node::Raw(text) => out.push_str(text),
            Node::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An element with its raw start and end tags
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    start_tag: String,
    end_tag: Option<String>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element rendered as `<name></name>`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Element {
            start_tag: format!("<{}>", name),
            end_tag: Some(format!("</{}>", name)),
            name,
            children: Vec::new(),
        }
    }

    /// Create an element holding a single text value
    pub fn with_text(name: impl Into<String>, value: &str) -> Self {
        let mut element = Element::new(name);
        element.children.push(Node::Text(partial_escape(value).into_owned()));
        element
    }

    /// Build an element from its raw start tag as found in the source.
    ///
    /// `end_tag` is filled in by the parser once the matching end is read;
    /// self-closing elements never get one.
    pub(crate) fn from_raw(name: String, start_tag: &str) -> Self {
        Element {
            name,
            start_tag: start_tag.to_string(),
            end_tag: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn close(&mut self, end_tag: &str) {
        self.end_tag = Some(end_tag.to_string());
    }

    /// Qualified name as written in the source
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without any namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn is_self_closing(&self) -> bool {
        self.end_tag.is_none()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element with the given local name
    pub fn child<'a>(&'a self, name: &str) -> Option<&'a Element> {
        self.elements().find(|e| e.local_name() == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|e| e.local_name() == name)
    }

    /// Index of the first child element with the given local name
    pub fn child_position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|node| {
            node.as_element()
                .map(|e| e.local_name() == name)
                .unwrap_or(false)
        })
    }

    /// Trimmed text of the first child element with the given local name
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text_trim)
    }

    /// Descendant element reached through an index path
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => self.children.get(*index)?.as_element()?.descendant(rest),
        }
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => self
                .children
                .get_mut(*index)?
                .as_element_mut()?
                .descendant_mut(rest),
        }
    }

    /// Paths of the elements reached by following `names`.
    ///
    /// Every name but the last selects the first matching child; the last
    /// name selects all matching children. Paths are relative to `self`.
    pub fn find_paths(&self, names: &[&str]) -> Vec<NodePath> {
        let Some((last, parents)) = names.split_last() else {
            return Vec::new();
        };

        let mut base = NodePath::new();
        let mut current = self;
        for name in parents {
            match current.child_position(name) {
                Some(index) => {
                    base.push(index);
                    current = match current.children[index].as_element() {
                        Some(element) => element,
                        None => return Vec::new(),
                    };
                }
                None => return Vec::new(),
            }
        }

        current
            .children
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                node.as_element()
                    .map(|e| e.local_name() == *last)
                    .unwrap_or(false)
            })
            .map(|(index, _)| {
                let mut path = base.clone();
                path.push(index);
                path
            })
            .collect()
    }

    /// Concatenated, unescaped character data of this element
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(raw) => out.push_str(&unescape_lossy(raw)),
                Node::CData(data) => out.push_str(data),
                _ => {}
            }
        }
        out
    }

    pub fn text_trim(&self) -> String {
        self.text().trim().to_string()
    }

    /// Replace the element's value, keeping the whitespace around it.
    ///
    /// The first non-blank text or CDATA node holds the value. A text node
    /// absorbs the text nodes directly after it and has its trimmed part
    /// replaced; a CDATA section keeps its markers. An element without such
    /// a node gets the value appended.
    pub fn rewrite_value(&mut self, value: &str) {
        let escaped = partial_escape(value);

        let Some(first) = self.children.iter().position(|node| match node {
            Node::Text(t) | Node::CData(t) => !t.trim().is_empty(),
            _ => false,
        }) else {
            self.open_if_self_closing();
            self.children.push(Node::Text(escaped.into_owned()));
            return;
        };

        if let Node::CData(data) = &self.children[first] {
            self.children[first] = Node::CData(replace_trimmed(data, value));
            return;
        }

        let mut merged = match &self.children[first] {
            Node::Text(text) => text.clone(),
            _ => String::new(),
        };
        while let Some(Node::Text(next)) = self.children.get(first + 1) {
            merged.push_str(next);
            self.children.remove(first + 1);
        }
        self.children[first] = Node::Text(replace_trimmed(&merged, &escaped));
    }

    /// Insert a child node at `index`
    pub fn insert_child(&mut self, index: usize, node: Node) {
        self.open_if_self_closing();
        self.children.insert(index, node);
    }

    /// Append a child node
    pub fn push_child(&mut self, node: Node) {
        self.open_if_self_closing();
        self.children.push(node);
    }

    pub fn remove_child(&mut self, index: usize) -> Node {
        self.children.remove(index)
    }

    /// Insert `element` right after the child at `index`, on its own line and
    /// with the indentation that child has.
    ///
    /// Returns the index of the inserted element.
    pub fn insert_after(&mut self, index: usize, element: Element, ls: &str) -> usize {
        let indent = self.indent_before(index).unwrap_or_else(|| "  ".to_string());
        self.insert_child(index + 1, Node::Text(format!("{}{}", ls, indent)));
        self.insert_child(index + 2, Node::Element(element));
        index + 2
    }

    /// Update, create or remove the child element `name`.
    ///
    /// * `Some(value)` on an existing child rewrites its value.
    /// * `Some(value)` on a missing child appends a new one, indented like the
    ///   other children.
    /// * `None` removes the child together with the whitespace before it.
    ///
    /// Returns the child element when one exists afterwards.
    pub fn rewrite_element(
        &mut self,
        name: &str,
        value: Option<&str>,
        ls: &str,
    ) -> Option<&mut Element> {
        match (self.child_position(name), value) {
            (Some(index), Some(value)) => {
                let element = self.children[index].as_element_mut()?;
                element.rewrite_value(value);
                Some(element)
            }
            (Some(index), None) => {
                self.children.remove(index);
                let mut i = index;
                while i > 0 && matches!(self.children[i - 1], Node::Text(_)) {
                    self.children.remove(i - 1);
                    i -= 1;
                }
                None
            }
            (None, Some(value)) => {
                let indent = self
                    .elements_positions()
                    .first()
                    .and_then(|first| self.indent_before(*first))
                    .unwrap_or_else(|| "    ".to_string());
                let insert_at = match self.children.last() {
                    Some(Node::Text(t)) if t.trim().is_empty() => self.children.len() - 1,
                    _ => self.children.len(),
                };
                self.insert_child(insert_at, Node::Text(format!("{}{}", ls, indent)));
                self.insert_child(insert_at + 1, Node::Element(Element::with_text(name, value)));
                self.children[insert_at + 1].as_element_mut()
            }
            (None, None) => None,
        }
    }

    fn elements_positions(&self) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Element(_)))
            .map(|(index, _)| index)
            .collect()
    }

    /// Whitespace after the last line break in the text node preceding `index`
    fn indent_before(&self, index: usize) -> Option<String> {
        let previous = index.checked_sub(1)?;
        match &self.children[previous] {
            Node::Text(text) if text.trim().is_empty() => {
                let line = text.rsplit(['\n', '\r']).next().unwrap_or(text);
                Some(line.to_string())
            }
            _ => None,
        }
    }

    fn open_if_self_closing(&mut self) {
        if self.end_tag.is_some() {
            return;
        }
        let body = self
            .start_tag
            .strip_suffix("/>")
            .unwrap_or(&self.start_tag)
            .trim_end();
        self.start_tag = format!("{}>", body);
        self.end_tag = Some(format!("</{}>", self.name));
    }

    /// Value of an attribute, unescaped
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attribute_span(name)
            .map(|value| unescape_lossy(value).into_owned())
    }

    /// Whether the start tag declares the attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_span(name).is_some()
    }

    /// Set an attribute, replacing its value in place or appending it to the
    /// start tag.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let escaped = escape(value);
        let existing = ATTRIBUTE_PATTERN
            .captures_iter(&self.start_tag)
            .find(|c| &c[1] == name)
            .and_then(|c| c.get(2).or_else(|| c.get(3)))
            .map(|m| m.range());

        if let Some(range) = existing {
            self.start_tag.replace_range(range, &escaped);
            return;
        }

        let close = if self.is_self_closing() { "/>" } else { ">" };
        let body = self.start_tag.strip_suffix(close).unwrap_or(&self.start_tag);
        let head = body.trim_end();
        let trailing = &body[head.len()..];
        self.start_tag = format!("{} {}=\"{}\"{}{}", head, name, escaped, trailing, close);
    }

    /// Remove an attribute together with the whitespace before it
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let found = ATTRIBUTE_PATTERN
            .captures_iter(&self.start_tag)
            .find(|c| &c[1] == name)
            .and_then(|c| c.get(0))
            .map(|m| m.range());

        match found {
            Some(range) => {
                let before = &self.start_tag[..range.start];
                let start = before.trim_end().len();
                self.start_tag.replace_range(start..range.end, "");
                true
            }
            None => false,
        }
    }

    fn attribute_span(&self, name: &str) -> Option<&str> {
        ATTRIBUTE_PATTERN
            .captures_iter(&self.start_tag)
            .find(|c| &c[1] == name)
            .and_then(|c| c.get(2).or_else(|| c.get(3)))
            .map(|m| &self.start_tag[m.range()])
    }

    /// Visit this element and every descendant element
    pub fn for_each_element_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for child in self.children.iter_mut() {
            if let Node::Element(element) = child {
                element.for_each_element_mut(visit);
            }
        }
    }

    /// Normalize line endings inside comments and CDATA sections
    pub fn normalize_line_endings(&mut self, ls: &str) {
        for child in self.children.iter_mut() {
            match child {
                Node::Comment(text) | Node::CData(text) => {
                    *text = normalize_line_endings(text, ls);
                }
                Node::Element(element) => element.normalize_line_endings(ls),
                _ => {}
            }
        }
    }

    pub(crate) fn push_raw_text(&mut self, raw: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(raw);
        } else {
            self.children.push(Node::Text(raw.to_string()));
        }
    }

    pub(crate) fn push_parsed(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Render the element back to markup
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.start_tag);
        for child in &self.children {
            child.write_to(out);
        }
        if let Some(end) = &self.end_tag {
            out.push_str(end);
        }
    }
}

/// Strip a namespace prefix from a qualified name
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Swap the trimmed part of `text` for `value`
fn replace_trimmed(text: &str, value: &str) -> String {
    let start = text.len() - text.trim_start().len();
    let end = start + text.trim().len();
    format!("{}{}{}", &text[..start], value, &text[end..])
}

fn unescape_lossy(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or(Cow::Borrowed(raw))
}
