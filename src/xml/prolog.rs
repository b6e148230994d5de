//! Text-level helpers around the root element
//!
//! Everything here works on plain strings so the intro/outro recovery can be
//! tested without a parsed tree.

use std::sync::LazyLock;

use regex::Regex;

static START_TAG_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z_][\w.:-]*)\s{2,}([^\s/>])").expect("hardcoded regex must compile")
});

static TIGHT_EMPTY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s])/>").expect("hardcoded regex must compile"));

/// Convert every `\r\n`, `\r` and `\n` to `ls`
pub fn normalize_line_endings(text: &str, ls: &str) -> String {
    let unix = text.replace("\r\n", "\n").replace('\r', "\n");
    if ls == "\n" {
        unix
    } else {
        unix.replace('\n', ls)
    }
}

/// Collapse runs of whitespace between an element name and its first
/// attribute, and put a space before `/>` in empty-element tags.
///
/// ```
/// # use pom_release::xml::prolog::normalize_tag_spacing;
/// assert_eq!(
///     normalize_tag_spacing("<project   xmlns=\"x\"><a/></project>"),
///     "<project xmlns=\"x\"><a /></project>"
/// );
/// ```
pub fn normalize_tag_spacing(content: &str) -> String {
    let collapsed = START_TAG_GAP.replace_all(content, "<$1 $2");
    TIGHT_EMPTY_TAG.replace_all(&collapsed, "$1 />").into_owned()
}

/// Split `content` into the text before and after the serialized root.
///
/// An exact match of `serialized_root` is tried first. When the root does
/// not serialize back to its source text, a structural scan takes over.
pub fn split_around_root(content: &str, serialized_root: &str) -> (String, String) {
    if !serialized_root.is_empty() {
        if let Some(start) = content.find(serialized_root) {
            let end = start + serialized_root.len();
            return (content[..start].to_string(), content[end..].to_string());
        }
    }
    tracing::debug!("Root element not found verbatim, scanning for prolog and epilog");
    structural_split(content)
}

/// Intro and outro found by scanning the markup around the root element
pub fn structural_split(content: &str) -> (String, String) {
    let intro_end = intro_len(content);
    let outro_start = outro_start(content, intro_end);
    (
        content[..intro_end].to_string(),
        content[outro_start..].to_string(),
    )
}

/// Length of the leading run of whitespace, XML declaration, processing
/// instructions, doctype and comments
pub fn intro_len(content: &str) -> usize {
    let mut pos = 0;
    loop {
        let rest = &content[pos..];
        pos += rest.len() - rest.trim_start().len();
        let rest = &content[pos..];

        let consumed = if rest.starts_with("<!--") {
            rest.find("-->").map(|end| end + 3)
        } else if rest.starts_with("<?") {
            markup_end(rest, false)
        } else if rest.starts_with("<!DOCTYPE") {
            markup_end(rest, true)
        } else {
            None
        };

        match consumed {
            Some(len) => pos += len,
            None => return pos,
        }
    }
}

/// Start of the trailing run of whitespace, comments and processing
/// instructions, never before `floor`
pub fn outro_start(content: &str, floor: usize) -> usize {
    let mut end = content.len();
    loop {
        let region = &content[floor..end];
        let trimmed = region.trim_end();
        let candidate = floor + trimmed.len();

        let open = if trimmed.ends_with("-->") {
            trimmed.rfind("<!--")
        } else if trimmed.ends_with("?>") {
            trimmed.rfind("<?")
        } else {
            None
        };

        match open {
            Some(open) => end = floor + open,
            None => return candidate,
        }
    }
}

/// Index just past the `>` closing a markup declaration, skipping quoted
/// literals and, for doctypes, the internal subset in brackets
fn markup_end(markup: &str, brackets: bool) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for (index, c) in markup.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') if brackets => depth += 1,
            (None, ']') if brackets => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some(index + 1),
            _ => {}
        }
    }
    None
}
