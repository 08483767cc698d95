//! Field validation: pure predicates over visitor input.
//!
//! Email validity is checked by two gates that must both pass: the WHATWG
//! `input type=email` rule (what a browser enforces natively) and a stricter
//! practical pattern. If the first gate cannot be built, a minimal
//! `something@something.something` heuristic is used instead so validation
//! never hard-fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// WHATWG "valid email address" production.
const PLATFORM_EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

static STRICT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
        .expect("strict email pattern is valid")
});

static FALLBACK_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("fallback email pattern is valid"));

static DEFAULT_VALIDATOR: LazyLock<EmailValidator> = LazyLock::new(EmailValidator::new);

/// Email validator holding the platform gate, if available.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    platform: Option<Regex>,
}

impl EmailValidator {
    /// Build a validator with the platform gate enabled.
    pub fn new() -> Self {
        let platform = match Regex::new(PLATFORM_EMAIL_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Platform email check unavailable, using heuristic: {}", e);
                None
            }
        };
        Self { platform }
    }

    /// Build a validator that only has the fallback heuristic.
    pub fn without_platform() -> Self {
        Self { platform: None }
    }

    /// Whether the platform gate is in use.
    pub fn has_platform_check(&self) -> bool {
        self.platform.is_some()
    }

    fn platform_check(&self, value: &str) -> Result<bool, ValidationError> {
        match &self.platform {
            Some(re) => Ok(re.is_match(value)),
            None => Err(ValidationError::PatternUnavailable(
                "platform email rule not compiled".to_string(),
            )),
        }
    }

    /// Check whether `value` is a well-formed email address.
    pub fn is_valid(&self, value: &str) -> bool {
        match self.platform_check(value) {
            Ok(true) => STRICT_EMAIL.is_match(value),
            Ok(false) => false,
            Err(e) => {
                tracing::debug!("{e}; falling back to heuristic");
                FALLBACK_EMAIL.is_match(value)
            }
        }
    }

    /// Like [`is_valid`](Self::is_valid) but as a `Result`.
    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        if self.is_valid(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidEmail {
                value: value.to_string(),
            })
        }
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check an email address with the process-wide default validator.
pub fn is_valid_email(value: &str) -> bool {
    DEFAULT_VALIDATOR.is_valid(value)
}
