//! Credentials that must never be printed.

use std::fmt;

const REDACTED: &str = "<REDACTED>";

/// A string whose `Debug` and `Display` output is `<REDACTED>`.
///
/// Holds the Anthropic API key and the optional bearer token for the API.
///
/// ```
/// use narrative_deconstruct::config::SecretString;
///
/// let token = SecretString::new("let-me-in");
/// assert_eq!(format!("{token:?}"), "<REDACTED>");
/// assert!(token.matches_bearer("Bearer let-me-in"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for the one place it is sent.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True for an empty secret.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check an `Authorization` header of the form `Bearer <token>`.
    ///
    /// The scheme is case-insensitive. Equal-length tokens are compared in
    /// full, without an early exit on the first differing byte.
    #[must_use]
    pub fn matches_bearer(&self, header_value: &str) -> bool {
        let Some((scheme, token)) = header_value.split_once(' ') else {
            return false;
        };
        if !scheme.eq_ignore_ascii_case("bearer") {
            return false;
        }

        let token = token.trim().as_bytes();
        let expected = self.0.as_bytes();
        token.len() == expected.len()
            && token
                .iter()
                .zip(expected)
                .fold(0u8, |diff, (a, b)| diff | (a ^ b))
                == 0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
