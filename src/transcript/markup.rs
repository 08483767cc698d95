//! Restricted inline markup: `<strong>…</strong>` emphasis and newlines.
//!
//! Everything else in a message is literal character data. The parser can
//! only ever produce [`Node::Text`], [`Node::LineBreak`] and
//! [`Node::Emphasis`], so echoing user input back into the transcript cannot
//! inject structure.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Non-greedy, case-insensitive emphasis pair. `.` does not cross newlines,
/// so a marker pair split over two lines stays literal text.
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<strong>(.*?)</strong>").expect("emphasis pattern is valid")
});

static MARKER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?strong>").expect("marker token pattern is valid"));

/// A single display node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Node {
    /// Literal text.
    Text(String),
    /// Explicit line break.
    LineBreak,
    /// Emphasized literal text. Never re-scanned for markers.
    Emphasis(String),
}

/// Parse restricted markup into display nodes.
pub fn parse(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;

    for caps in EMPHASIS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_literal(&mut nodes, &text[last..whole.start()]);
        let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        nodes.push(Node::Emphasis(inner.to_string()));
        last = whole.end();
    }

    push_literal(&mut nodes, &text[last..]);
    nodes
}

/// Split a literal span on `\n` into text and break nodes.
fn push_literal(nodes: &mut Vec<Node>, span: &str) {
    for (i, part) in span.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::LineBreak);
        }
        if !part.is_empty() {
            nodes.push(Node::Text(part.to_string()));
        }
    }
}

/// Remove emphasis delimiter tokens from untrusted text before it is
/// embedded inside bot-authored markup.
pub fn strip_markers(text: &str) -> String {
    MARKER_TOKEN.replace_all(text, "").into_owned()
}

/// Wrap text in an emphasis pair.
///
/// Whitespace runs (newlines included) collapse to single spaces, since a
/// pair cannot span lines.
pub fn emphasize(text: &str) -> String {
    let stripped = strip_markers(text);
    let flat = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("<strong>{flat}</strong>")
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
