//! Cleaned HTML → `DocNode` tree.
//!
//! The optimized résumé comes back from the model as an HTML fragment, often
//! wrapped in markdown fences. `clean_optimized_html` normalises it once, at
//! analysis time; `parse_fragment` turns the cleaned fragment into the small
//! tree the layout engine walks.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

/// Elements whose content never reaches the page.
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocNode {
    Element { tag: String, children: Vec<DocNode> },
    Text(String),
}

impl DocNode {
    /// Concatenated descendant text with whitespace runs collapsed to single spaces.
    pub fn collapsed_text(&self) -> String {
        let mut raw = String::new();
        self.push_raw_text(&mut raw);
        collapse_whitespace(&raw)
    }

    /// Descendant text exactly as parsed, newlines included.
    pub fn raw_text(&self) -> String {
        let mut raw = String::new();
        self.push_raw_text(&mut raw);
        raw
    }

    fn push_raw_text(&self, out: &mut String) {
        match self {
            DocNode::Text(text) => out.push_str(text),
            DocNode::Element { tag, children } => {
                // <br> inside a heading or paragraph still separates words.
                if tag == "br" {
                    out.push('\n');
                }
                for child in children {
                    child.push_raw_text(out);
                }
            }
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Cleaning
// ────────────────────────────────────────────────────────────────────────────

struct CleaningPatterns {
    html_fence: Regex,
    bare_fence: Regex,
    leading_html_line: Regex,
    bold_markdown: Regex,
}

fn patterns() -> &'static CleaningPatterns {
    static PATTERNS: OnceLock<CleaningPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CleaningPatterns {
        html_fence: Regex::new(r"(?i)```html\n?").expect("html fence regex is valid"),
        bare_fence: Regex::new(r"```\n?").expect("bare fence regex is valid"),
        leading_html_line: Regex::new(r"(?i)\A\s*html\s*\n").expect("html line regex is valid"),
        bold_markdown: Regex::new(r"\*\*(.+?)\*\*").expect("bold regex is valid"),
    })
}

/// Normalises a model completion into an HTML fragment.
///
/// Strips code fences and a leading bare `html` line, wraps plain text in a
/// `<pre>` container and turns `**bold**` into `<strong>`. Already-clean HTML
/// comes back unchanged.
pub fn clean_optimized_html(raw: &str) -> String {
    let p = patterns();
    let without_html_fence = p.html_fence.replace_all(raw, "");
    let without_fences = p.bare_fence.replace_all(&without_html_fence, "");
    let without_label = p.leading_html_line.replace(&without_fences, "");
    let trimmed = without_label.trim();

    let html = if !trimmed.contains('<') || !trimmed.contains('>') {
        format!(
            "<div class=\"resume-container\"><pre>{}</pre></div>",
            escape_html(trimmed)
        )
    } else {
        trimmed.to_string()
    };

    p.bold_markdown
        .replace_all(&html, "<strong>$1</strong>")
        .into_owned()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses an HTML fragment with the HTML5 tree builder.
///
/// Returns the top-level nodes of the fragment. Comments, doctype and the
/// contents of `script`/`style`/`head`/`title` are dropped.
pub fn parse_fragment(html: &str) -> Vec<DocNode> {
    let fragment = Html::parse_fragment(html);
    convert_children(fragment.root_element())
}

fn convert_children(element: ElementRef<'_>) -> Vec<DocNode> {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                Some(DocNode::Text(text.to_string()))
            }
            Node::Element(_) => ElementRef::wrap(child).and_then(convert_element),
            _ => None,
        })
        .collect()
}

fn convert_element(element: ElementRef<'_>) -> Option<DocNode> {
    let tag = element.value().name().to_ascii_lowercase();
    if SKIPPED_TAGS.contains(&tag.as_str()) {
        return None;
    }
    Some(DocNode::Element {
        children: convert_children(element),
        tag,
    })
}
