//! Transcript: append-only list of rendered chat messages.
//!
//! Messages are parsed from restricted markup into display nodes (see
//! [`markup`]) and appended to a [`TranscriptContainer`]. The in-memory
//! [`Transcript`] is the default container; front-ends provide their own.

pub mod markup;

use serde::{Deserialize, Serialize};

pub use markup::{Node, emphasize, escape_html, parse, strip_markers};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// CSS class used when the message is serialized to HTML.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::User => "user-msg",
            Self::Bot => "bot-msg",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A rendered message. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub sender: Sender,
    pub nodes: Vec<Node>,
}

impl TranscriptMessage {
    /// Parse `text` and build a message.
    pub fn new(text: &str, sender: Sender) -> Self {
        Self {
            sender,
            nodes: parse(text),
        }
    }

    /// Text content with breaks as `\n` and emphasis unmarked.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(t) | Node::Emphasis(t) => out.push_str(t),
                Node::LineBreak => out.push('\n'),
            }
        }
        out
    }

    /// Number of emphasis nodes.
    pub fn emphasis_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Emphasis(_)))
            .count()
    }

    /// Serialize as an HTML `div`. All text is escaped.
    pub fn to_html(&self) -> String {
        let mut out = format!("<div class=\"{}\">", self.sender.css_class());
        for node in &self.nodes {
            match node {
                Node::Text(t) => out.push_str(&escape_html(t)),
                Node::LineBreak => out.push_str("<br>"),
                Node::Emphasis(t) => {
                    out.push_str("<strong>");
                    out.push_str(&escape_html(t));
                    out.push_str("</strong>");
                }
            }
        }
        out.push_str("</div>");
        out
    }
}

/// A scrollable container that messages are appended to.
pub trait TranscriptContainer {
    /// Append a message at the end.
    fn append(&mut self, message: TranscriptMessage);

    /// Scroll so the newest message is visible.
    fn scroll_to_latest(&mut self);
}

/// Parse `text`, append it to `container` and reveal it.
pub fn render(container: &mut dyn TranscriptContainer, text: &str, sender: Sender) {
    container.append(TranscriptMessage::new(text, sender));
    container.scroll_to_latest();
}

/// In-memory transcript.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<TranscriptMessage>,
    /// Index of the first visible message.
    scroll_top: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptMessage> {
        self.messages.last()
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_height(&self) -> usize {
        self.messages.len()
    }

    /// Serialize the whole transcript as HTML fragments, one per message.
    pub fn to_html(&self) -> String {
        self.messages
            .iter()
            .map(TranscriptMessage::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TranscriptContainer for Transcript {
    fn append(&mut self, message: TranscriptMessage) {
        self.messages.push(message);
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_top = self.messages.len().saturating_sub(1);
    }
}
