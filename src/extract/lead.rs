//! Rendered HTML → lead-section prose.

use ego_tree::iter::Edge;
use scraper::{Html, Node};

use crate::constants::SUPPRESSED_CLASS_MARKERS;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Elements whose opening may suspend capture, and whose closing always resumes it.
const LATCH_ELEMENTS: [&str; 4] = ["style", "script", "table", "div"];

/// Returns the plain-text lead section of a rendered article.
///
/// Everything from the first `<h2` onwards is discarded before parsing. Only
/// text inside `<p>` elements is kept, and never while a style, script or
/// boilerplate container (infobox, navbox, metadata, toc) is open. Whitespace
/// inside a paragraph is kept as-is; paragraphs are joined by one blank line.
pub fn lead_text(html: &str) -> String {
    let lead_html = truncate_at_first_section(html);
    let fragment = Html::parse_fragment(lead_html);

    let mut scan = LeadScan::default();
    for edge in fragment.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(element) => scan.open(element.name(), element.attr("class")),
                Node::Text(text) => scan.text(text),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(element) = node.value() {
                    scan.close(element.name());
                }
            }
        }
    }

    normalize_paragraphs(&scan.pieces.concat())
}

fn truncate_at_first_section(html: &str) -> &str {
    match html.find("<h2") {
        Some(pos) => &html[..pos],
        None => html,
    }
}

/// Tag-aware capture state: an in-paragraph flag and a depth-unaware skip latch.
#[derive(Default)]
struct LeadScan {
    pieces: Vec<String>,
    in_paragraph: bool,
    skipping: bool,
}

impl LeadScan {
    fn open(&mut self, name: &str, class: Option<&str>) {
        if name == "p" {
            self.in_paragraph = true;
        }
        if LATCH_ELEMENTS.contains(&name) && suppresses(name, class) {
            self.skipping = true;
        }
    }

    fn close(&mut self, name: &str) {
        if name == "p" {
            let needs_break = self.in_paragraph
                && self
                    .pieces
                    .last()
                    .is_some_and(|last| !last.ends_with(PARAGRAPH_BREAK));
            if needs_break {
                self.pieces.push(PARAGRAPH_BREAK.to_string());
            }
            self.in_paragraph = false;
        }
        if LATCH_ELEMENTS.contains(&name) {
            self.skipping = false;
        }
    }

    fn text(&mut self, data: &str) {
        if self.in_paragraph && !self.skipping && !data.is_empty() {
            self.pieces.push(data.to_string());
        }
    }
}

fn suppresses(name: &str, class: Option<&str>) -> bool {
    if matches!(name, "style" | "script") {
        return true;
    }
    class.is_some_and(|class| {
        SUPPRESSED_CLASS_MARKERS
            .iter()
            .any(|marker| class.contains(*marker))
    })
}

/// Trims the text, then rebuilds it from its non-empty paragraphs.
///
/// Runs of three or more newlines collapse to a single paragraph break and
/// blank paragraphs disappear.
fn normalize_paragraphs(text: &str) -> String {
    text.trim()
        .split(PARAGRAPH_BREAK)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BREAK)
}
