//! Layout engine: `DocNode` tree → positioned draw operations.
//!
//! A depth-first, pre-order walk. Block handlers (headings, paragraphs, list
//! items, inline emphasis) take their element's whole descendant text, wrap it
//! against the Helvetica width tables and emit one `DrawOp::Text` per line.
//! Pagination happens per wrapped line, so a long paragraph flows across a
//! page break instead of being clipped.
//!
//! Coordinates are points measured from the top-left corner of the page; `y`
//! on a text op is the baseline. The PDF backend flips them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::layout::document::{collapse_whitespace, parse_fragment, DocNode};
use crate::layout::font_metrics::{get_metrics, FontFace, FontStyle, FontWeight};

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub base_font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
}

impl PageConfig {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height_factor
    }

    /// Lowest point a line may reach before the page breaks.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin
    }
}

/// US Letter, half-inch margins, 10 pt body text.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width: 612.0,
        page_height: 792.0,
        margin: 36.0,
        base_font_size: 10.0,
        line_height_factor: 1.25,
    }
}

const H1_SIZE: f32 = 15.0;
const H2_SIZE: f32 = 11.0;
const H3_SIZE: f32 = 11.0;
const RULE_THICKNESS: f32 = 0.75;
const BULLET_PREFIX: &str = "• ";

// Vertical spacing, in points.
const H1_BEFORE: f32 = 2.0;
const H1_AFTER: f32 = 2.0;
const H2_BEFORE: f32 = 8.0;
const H2_AFTER: f32 = 3.0;
const H3_BEFORE: f32 = 5.0;
const H3_AFTER: f32 = 3.0;
const PARAGRAPH_AFTER: f32 = 4.0;
const LIST_ITEM_AFTER: f32 = 1.0;
const LIST_AFTER: f32 = 4.0;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        /// Zero-based page index.
        page: usize,
        x: f32,
        /// Baseline, from the page top.
        y: f32,
        text: String,
        font_size: f32,
        weight: FontWeight,
        style: FontStyle,
    },
    Rule {
        page: usize,
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Text { page, .. } | DrawOp::Rule { page, .. } => *page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub page_count: usize,
    pub ops: Vec<DrawOp>,
}

pub fn suggested_filename(date: NaiveDate) -> String {
    format!("Optimized_Resume_{}.pdf", date.format("%Y-%m-%d"))
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

/// Write position on the active page plus everything emitted so far.
struct LayoutCursor {
    config: PageConfig,
    page: usize,
    /// Top of the next line, from the page top.
    y: f32,
    ops: Vec<DrawOp>,
}

impl LayoutCursor {
    fn new(config: PageConfig) -> Self {
        Self {
            config,
            page: 0,
            y: config.margin,
            ops: Vec::new(),
        }
    }

    /// Starts a new page when `height` more points would cross the bottom margin.
    fn ensure_space(&mut self, height: f32) {
        if self.y + height > self.config.bottom_limit() && self.y > self.config.margin {
            self.page += 1;
            self.y = self.config.margin;
        }
    }

    fn advance(&mut self, points: f32) {
        self.y += points;
    }

    /// Height `text` occupies once wrapped.
    fn wrapped_height(
        &self,
        text: &str,
        font_size: f32,
        weight: FontWeight,
        style: FontStyle,
    ) -> f32 {
        let metrics = get_metrics(FontFace::for_style(weight, style));
        let lines = metrics
            .wrap_text(text, font_size, self.config.content_width())
            .len();
        lines as f32 * self.config.line_height(font_size)
    }

    fn write(&mut self, text: &str, font_size: f32, weight: FontWeight, style: FontStyle) {
        let metrics = get_metrics(FontFace::for_style(weight, style));
        let line_height = self.config.line_height(font_size);
        for line in metrics.wrap_text(text, font_size, self.config.content_width()) {
            self.ensure_space(line_height);
            self.ops.push(DrawOp::Text {
                page: self.page,
                x: self.config.margin,
                y: self.y + font_size,
                text: line,
                font_size,
                weight,
                style,
            });
            self.advance(line_height);
        }
    }

    fn write_body(&mut self, text: &str) {
        self.write(
            text,
            self.config.base_font_size,
            FontWeight::Normal,
            FontStyle::Normal,
        );
    }

    fn rule(&mut self) {
        self.ensure_space(RULE_THICKNESS);
        self.ops.push(DrawOp::Rule {
            page: self.page,
            x1: self.config.margin,
            x2: self.config.page_width - self.config.margin,
            y: self.y,
            thickness: RULE_THICKNESS,
        });
    }

    fn finish(self) -> LayoutDocument {
        LayoutDocument {
            page_width: self.config.page_width,
            page_height: self.config.page_height,
            page_count: self.page + 1,
            ops: self.ops,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Walk
// ────────────────────────────────────────────────────────────────────────────

/// Parses and lays out a cleaned HTML fragment.
pub fn layout_html(html: &str, config: &PageConfig) -> LayoutDocument {
    layout_nodes(&parse_fragment(html), config)
}

pub fn layout_nodes(nodes: &[DocNode], config: &PageConfig) -> LayoutDocument {
    let mut cursor = LayoutCursor::new(*config);
    for node in nodes {
        layout_node(&mut cursor, node);
    }
    cursor.finish()
}

fn layout_node(cursor: &mut LayoutCursor, node: &DocNode) {
    let (tag, children) = match node {
        DocNode::Text(text) => {
            let text = collapse_whitespace(text);
            if !text.is_empty() {
                cursor.write_body(&text);
            }
            return;
        }
        DocNode::Element { tag, children } => (tag.as_str(), children),
    };

    match tag {
        "h1" => block(cursor, node, H1_BEFORE, H1_AFTER, |c, text| {
            c.write(text, H1_SIZE, FontWeight::Bold, FontStyle::Normal)
        }),
        "h2" => block(cursor, node, H2_BEFORE, 0.0, |c, text| {
            let heading = text.to_uppercase();
            // Heading and its rule stay on one page.
            let height = c.wrapped_height(&heading, H2_SIZE, FontWeight::Bold, FontStyle::Normal);
            c.ensure_space(height + RULE_THICKNESS);
            c.write(&heading, H2_SIZE, FontWeight::Bold, FontStyle::Normal);
            c.rule();
            c.advance(H2_AFTER);
        }),
        "h3" => block(cursor, node, H3_BEFORE, H3_AFTER, |c, text| {
            c.write(text, H3_SIZE, FontWeight::Bold, FontStyle::Normal)
        }),
        "p" => block(cursor, node, 0.0, PARAGRAPH_AFTER, |c, text| c.write_body(text)),
        "ul" => {
            for child in children {
                if matches!(child, DocNode::Element { tag, .. } if tag == "li") {
                    block(cursor, child, 0.0, LIST_ITEM_AFTER, |c, text| {
                        c.write_body(&format!("{BULLET_PREFIX}{text}"))
                    });
                }
            }
            cursor.advance(LIST_AFTER);
        }
        "strong" | "b" => block(cursor, node, 0.0, 0.0, |c, text| {
            let size = c.config.base_font_size;
            c.write(text, size, FontWeight::Bold, FontStyle::Normal)
        }),
        "em" | "i" => block(cursor, node, 0.0, 0.0, |c, text| {
            let size = c.config.base_font_size;
            c.write(text, size, FontWeight::Normal, FontStyle::Italic)
        }),
        "br" => {
            let line = cursor.config.line_height(cursor.config.base_font_size);
            cursor.advance(line);
        }
        "pre" => layout_preformatted(cursor, node),
        _ => {
            for child in children {
                layout_node(cursor, child);
            }
        }
    }
}

/// Lays out an element's collapsed text with spacing around it; empty elements emit nothing.
fn block<F>(cursor: &mut LayoutCursor, node: &DocNode, before: f32, after: f32, draw: F)
where
    F: FnOnce(&mut LayoutCursor, &str),
{
    let text = node.collapsed_text();
    if text.is_empty() {
        return;
    }
    cursor.advance(before);
    draw(cursor, &text);
    cursor.advance(after);
}

/// Plain-text résumés arrive as `<pre>`; keep their line structure.
fn layout_preformatted(cursor: &mut LayoutCursor, node: &DocNode) {
    let raw = node.raw_text();
    let blank_line = cursor.config.line_height(cursor.config.base_font_size);
    for line in raw.trim_matches('\n').lines() {
        if line.trim().is_empty() {
            cursor.advance(blank_line);
        } else {
            cursor.write_body(line);
        }
    }
    cursor.advance(PARAGRAPH_AFTER);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_ops(doc: &LayoutDocument) -> Vec<(&str, f32, FontWeight, FontStyle)> {
        doc.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    text,
                    font_size,
                    weight,
                    style,
                    ..
                } => Some((text.as_str(), *font_size, *weight, *style)),
                DrawOp::Rule { .. } => None,
            })
            .collect()
    }

    fn rule_count(doc: &LayoutDocument) -> usize {
        doc.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rule { .. }))
            .count()
    }

    #[test]
    fn test_heading_section_and_bullets() {
        let doc = layout_html(
            "<h1>Jane</h1><h2>Experience</h2><ul><li>Did X</li><li>Did Y</li></ul>",
            &default_page_config(),
        );
        let texts = text_ops(&doc);
        assert_eq!(
            texts,
            vec![
                ("Jane", 15.0, FontWeight::Bold, FontStyle::Normal),
                ("EXPERIENCE", 11.0, FontWeight::Bold, FontStyle::Normal),
                ("• Did X", 10.0, FontWeight::Normal, FontStyle::Normal),
                ("• Did Y", 10.0, FontWeight::Normal, FontStyle::Normal),
            ]
        );
        assert_eq!(rule_count(&doc), 1);
        assert_eq!(doc.page_count, 1);
    }

    #[test]
    fn test_rule_sits_below_section_heading() {
        let doc = layout_html("<h2>Skills</h2><p>Rust</p>", &default_page_config());
        let heading_y = match &doc.ops[0] {
            DrawOp::Text { y, .. } => *y,
            other => panic!("expected heading text, got {other:?}"),
        };
        match &doc.ops[1] {
            DrawOp::Rule { y, x1, x2, .. } => {
                assert!(*y > heading_y);
                assert_eq!(*x1, 36.0);
                assert_eq!(*x2, 576.0);
            }
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn test_ops_are_in_document_order() {
        let doc = layout_html(
            "<h1>A</h1><p>B</p><h3>C</h3><p>D</p>",
            &default_page_config(),
        );
        let ys: Vec<f32> = doc
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Text { y, .. } | DrawOp::Rule { y, .. } => *y,
            })
            .collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]), "y not increasing: {ys:?}");
    }

    #[test]
    fn test_inline_emphasis_fonts() {
        let doc = layout_html(
            "<div><strong>Bold</strong><em>Slanted</em></div>",
            &default_page_config(),
        );
        let texts = text_ops(&doc);
        assert_eq!(texts[0].2, FontWeight::Bold);
        assert_eq!(texts[1].3, FontStyle::Italic);
    }

    #[test]
    fn test_empty_fragment_is_single_blank_page() {
        let doc = layout_html("", &default_page_config());
        assert_eq!(doc.page_count, 1);
        assert!(doc.ops.is_empty());
    }

    #[test]
    fn test_long_paragraph_wraps_within_content_width() {
        let config = default_page_config();
        let sentence = "Designed and shipped a multi-region event pipeline in Rust. ";
        let html = format!("<p>{}</p>", sentence.repeat(12));
        let doc = layout_html(&html, &config);
        let texts = text_ops(&doc);
        assert!(texts.len() > 1);
        let metrics = get_metrics(FontFace::Helvetica);
        for (text, size, _, _) in texts {
            assert!(metrics.measure_pt(text, size) <= config.content_width() + 1e-3);
        }
    }

    #[test]
    fn test_overflow_paginates_without_clipping_or_duplication() {
        let config = default_page_config();
        let html: String = (0..150)
            .map(|i| format!("<p>Paragraph number {i}</p>"))
            .collect();
        let doc = layout_html(&html, &config);

        assert!(doc.page_count >= 2);
        let mut last_page = 0;
        for op in &doc.ops {
            assert!(op.page() >= last_page, "pages must not go backwards");
            assert!(op.page() < doc.page_count);
            last_page = op.page();
            if let DrawOp::Text { y, .. } = op {
                assert!(*y <= config.bottom_limit(), "line below bottom margin at y={y}");
                assert!(*y > config.margin);
            }
        }
        for i in 0..150 {
            let wanted = format!("Paragraph number {i}");
            let hits = text_ops(&doc).iter().filter(|t| t.0 == wanted).count();
            assert_eq!(hits, 1, "{wanted} drawn {hits} times");
        }
    }

    #[test]
    fn test_preformatted_keeps_lines() {
        let doc = layout_html(
            "<div class=\"resume-container\"><pre>Jane Doe\n\nRust Engineer</pre></div>",
            &default_page_config(),
        );
        let texts: Vec<&str> = text_ops(&doc).iter().map(|t| t.0).collect();
        assert_eq!(texts, vec!["Jane Doe", "Rust Engineer"]);
    }

    #[test]
    fn test_empty_heading_emits_nothing() {
        let doc = layout_html("<h2>  </h2><p></p>", &default_page_config());
        assert!(doc.ops.is_empty());
    }

    #[test]
    fn test_suggested_filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(suggested_filename(date), "Optimized_Resume_2024-03-09.pdf");
    }

    #[test]
    fn test_single_paragraph_splits_across_pages() {
        let config = default_page_config();
        let words: Vec<String> = (0..2000).map(|i| format!("w{i}")).collect();
        let doc = layout_html(&format!("<p>{}</p>", words.join(" ")), &config);

        assert!(doc.page_count >= 2);
        assert!(doc.ops.iter().any(|op| op.page() == 0));
        assert!(doc.ops.iter().any(|op| op.page() == 1));
        for op in &doc.ops {
            if let DrawOp::Text { y, .. } = op {
                assert!(*y <= config.bottom_limit(), "line below bottom margin at y={y}");
            }
        }

        let lines: Vec<&str> = text_ops(&doc).iter().map(|t| t.0).collect();
        assert_eq!(lines.join(" "), words.join(" "));
    }

    #[test]
    fn test_section_rule_stays_with_heading_at_page_end() {
        // Two body paragraphs leave exactly 14pt above the bottom margin for the
        // heading: room for its line, not for the line plus the rule.
        let config = PageConfig {
            page_height: 127.0,
            ..default_page_config()
        };
        let doc = layout_html("<p>One</p><p>Two</p><h2>Skills</h2><p>Rust</p>", &config);

        let heading_page = doc
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { page, text, .. } if text == "SKILLS" => Some(*page),
                _ => None,
            })
            .unwrap();
        let rule_page = doc
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Rule { page, .. } => Some(*page),
                _ => None,
            })
            .unwrap();
        assert_eq!(heading_page, 1);
        assert_eq!(rule_page, heading_page);
    }
}
