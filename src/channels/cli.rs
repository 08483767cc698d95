//! CLI channel: stdin/stdout front-end for the lead conversation.
//!
//! Each line read from stdin is typed into a [`TerminalField`] and submitted.
//! A line holding only ESC (or `/cancel`) acts as the cancel key, and `/quit`
//! or EOF ends the session.

use std::io::Write;
use std::pin::Pin;

use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::binding::{CANCEL_KEY, Form, InputBinding, InputEvent, TextField};
use crate::conversation::ConversationEngine;
use crate::error::Result;
use crate::transcript::{Node, Sender, TranscriptContainer, TranscriptMessage};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// One line of terminal input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliInput {
    /// Text to submit.
    Line(String),
    /// Cancel key.
    Cancel,
    /// End the session.
    Quit,
}

impl CliInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        match trimmed.trim() {
            "\x1b" | "/cancel" => Self::Cancel,
            "/quit" => Self::Quit,
            _ => Self::Line(trimmed.to_string()),
        }
    }
}

pub type InputStream = Pin<Box<dyn Stream<Item = CliInput> + Send>>;

/// Reads stdin lines on a background task.
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &str {
        "cli"
    }

    /// Start reading stdin. The stream ends at EOF or on a read error.
    pub fn start(&self) -> InputStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(CliInput::parse(&line)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|input| (input, rx))
        });

        Box::pin(stream)
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal stand-in for the text input. Prints the prompt on focus.
#[derive(Debug, Default)]
pub struct TerminalField {
    value: String,
    label: String,
    disabled: bool,
}

impl TerminalField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl TextField for TerminalField {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn focus(&mut self) {
        eprint!("{}> ", self.label);
    }

    fn blur(&mut self) {
        eprintln!();
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn set_aria_label(&mut self, label: &str) {
        self.label = label.to_string();
    }
}

/// Terminal stand-in for the form.
#[derive(Debug, Default)]
pub struct TerminalForm;

impl Form for TerminalForm {
    fn set_busy(&mut self, busy: bool) {
        tracing::trace!(busy, "Form busy state changed");
    }
}

/// Transcript that prints each message as it is appended.
pub struct TerminalTranscript<W: Write> {
    out: W,
    color: bool,
}

impl TerminalTranscript<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
            color: true,
        }
    }
}

impl<W: Write> TerminalTranscript<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}

/// Drop control characters so echoed text cannot drive the terminal.
fn printable(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

/// Format a message for the terminal. Emphasis is bold when `color` is set,
/// otherwise wrapped in asterisks.
pub fn format_message(message: &TranscriptMessage, color: bool) -> String {
    let prefix = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    let mut body = String::new();
    for node in &message.nodes {
        match node {
            Node::Text(t) => body.push_str(&printable(t)),
            Node::LineBreak => body.push_str("\n     "),
            Node::Emphasis(t) if color => {
                body.push_str(BOLD);
                body.push_str(&printable(t));
                body.push_str(RESET);
            }
            Node::Emphasis(t) => {
                body.push('*');
                body.push_str(&printable(t));
                body.push('*');
            }
        }
    }
    format!("{prefix}: {body}")
}

impl<W: Write> TranscriptContainer for TerminalTranscript<W> {
    fn append(&mut self, message: TranscriptMessage) {
        let line = format_message(&message, self.color);
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::warn!("Failed to write transcript line: {}", e);
        }
    }

    fn scroll_to_latest(&mut self) {
        let _ = self.out.flush();
    }
}

/// Feed terminal input through the binding until `/quit` or EOF.
pub async fn run_session<W: Write>(
    mut inputs: InputStream,
    binding: &mut InputBinding<TerminalForm, TerminalField>,
    engine: &mut ConversationEngine,
    transcript: &mut TerminalTranscript<W>,
) -> Result<()> {
    binding.field_mut().focus();
    while let Some(input) = inputs.next().await {
        match input {
            CliInput::Quit => break,
            CliInput::Cancel => {
                binding
                    .dispatch(InputEvent::key(CANCEL_KEY), engine, transcript)
                    .await;
                binding.field_mut().focus();
            }
            CliInput::Line(line) => {
                binding.field_mut().set_value(&line);
                binding
                    .dispatch(InputEvent::Submit, engine, transcript)
                    .await;
            }
        }
        transcript.flush()?;
    }
    transcript.flush()?;
    Ok(())
}
