//! Configuration types.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Logical collection that completed leads are appended to.
pub const LEADS_COLLECTION: &str = "leads";

/// Connection settings for the external document store.
///
/// Built from environment variables. The credential key is optional here so
/// that a half-configured deployment can be told apart from a missing one;
/// the gateway refuses to connect without it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Local database path, or a `libsql://` / `https://` URL.
    pub url: String,
    /// Credential key (auth token for remote databases).
    pub api_key: Option<SecretString>,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: Some(SecretString::from(api_key.into())),
        }
    }

    /// Build config from environment variables.
    /// Returns `None` if `LEAD_CHAT_STORE_URL` is not set (persistence disabled).
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let url = lookup("LEAD_CHAT_STORE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;

        let api_key = lookup("LEAD_CHAT_STORE_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        Some(Self { url, api_key })
    }

    /// Whether a non-empty credential key is present.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Whether `url` points at a remote database rather than a local file.
    pub fn is_remote(&self) -> bool {
        let url = self.url.to_ascii_lowercase();
        url.starts_with("libsql://") || url.starts_with("https://") || url.starts_with("http://")
    }

    /// Check that the settings are usable for connecting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.has_credential() {
            return Err(ConfigError::MissingCredential {
                key: "LEAD_CHAT_STORE_API_KEY".to_string(),
            });
        }
        if self.url.contains("://") && !self.is_remote() {
            return Err(ConfigError::InvalidValue {
                key: "LEAD_CHAT_STORE_URL".to_string(),
                message: format!("unsupported scheme in {}", self.url),
            });
        }
        Ok(())
    }
}

/// Bot copy used by the conversation engine.
#[derive(Debug, Clone)]
pub struct ChatCopy {
    pub ask_name: String,
    /// Greeting after the name is given. `{name}` is replaced with the
    /// visitor's name wrapped in emphasis markup.
    pub greet_and_ask_email: String,
    pub invalid_email: String,
    pub ask_message: String,
    pub saving: String,
    pub saved: String,
    pub save_failed: String,
    /// Accessibility label for the input field.
    pub input_label: String,
}

impl Default for ChatCopy {
    fn default() -> Self {
        Self {
            ask_name: "Awesome! What's your name?".to_string(),
            greet_and_ask_email: "Nice to meet you, {name}! Can I get your email?".to_string(),
            invalid_email:
                "That doesn't look like a valid email. Please enter a valid email address."
                    .to_string(),
            ask_message: "Got it! Would you like to leave any message or interest note?"
                .to_string(),
            saving: "Thanks! Saving your info...".to_string(),
            saved: "You're all set. We'll reach out when we launch 🚀".to_string(),
            save_failed:
                "Thanks, we couldn't save your info right now, but we'll try to reach you."
                    .to_string(),
            input_label: "Type a message".to_string(),
        }
    }
}
