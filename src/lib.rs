//! lead-chat: linear conversational lead-capture form.

pub mod binding;
pub mod channels;
pub mod config;
pub mod conversation;
pub mod error;
pub mod store;
pub mod transcript;
pub mod validation;
