// src/utils/html_text.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, Html};

// Tags after which the rendered text starts a new line
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "tr", "li", "table", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "document",
    "page",
];

// Tags whose text is never part of the narrative
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title"];

static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*/?\s*(html|body|div|p|font|table|span|br)\b").unwrap());

static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").unwrap());

/// Returns true when the document carries HTML markup worth flattening.
pub fn looks_like_html(content: &str) -> bool {
    HTML_TAG_RE.is_match(content)
}

/// Flattens an HTML (or EDGAR SGML-wrapped HTML) filing into plain text.
/// Block-level elements start new lines so "Item N." headings stay at line starts.
/// Plain-text input is returned unchanged.
pub fn html_to_text(content: &str) -> String {
    if !looks_like_html(content) {
        return content.to_string();
    }

    let document = Html::parse_document(content);
    let mut text = String::with_capacity(content.len() / 2);

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Element(element) => {
                if BLOCK_TAGS.contains(&element.name()) && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Node::Text(text_node) => {
                let skipped = node
                    .ancestors()
                    .filter_map(|a| a.value().as_element())
                    .any(|el| SKIPPED_TAGS.contains(&el.name()));
                if !skipped {
                    text.push_str(&text_node.text.replace('\u{a0}', " "));
                }
            }
            _ => {} // Ignore comments, doctype, etc.
        }
    }

    let collapsed = BLANK_LINES_RE.replace_all(&text, "\n\n");
    tracing::debug!("Flattened {} bytes of HTML into {} bytes of text", content.len(), collapsed.len());
    collapsed.trim().to_string()
}
