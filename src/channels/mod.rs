//! Front-ends that drive the conversation through the input binding.

pub mod cli;

pub use cli::{
    CliChannel, CliInput, InputStream, TerminalField, TerminalForm, TerminalTranscript, run_session,
};
