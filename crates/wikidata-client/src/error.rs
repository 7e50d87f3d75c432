//! Error types for the Wikidata client

use std::fmt;

/// Errors that can occur when talking to Wikidata or Commons
#[derive(Debug)]
pub enum WikidataError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse a JSON body we had to read (edits, tokens)
    Json(serde_json::Error),
    /// Upstream answered with a non-success status code
    Status(u16),
    /// The action API reported an error
    Api { code: String, info: String },
    /// Request signing failed
    OAuth(mediawiki_oauth::OAuthError),
    /// No usable CSRF token (session not authorized for editing)
    MissingToken,
}

impl WikidataError {
    /// Whether a read may be attempted again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for WikidataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Wikidata HTTP error: {}", e),
            Self::Json(e) => write!(f, "Wikidata JSON parse error: {}", e),
            Self::Status(code) => write!(f, "Wikidata returned status {}", code),
            Self::Api { code, info } => write!(f, "Wikidata API error {}: {}", code, info),
            Self::OAuth(e) => write!(f, "Wikidata request signing failed: {}", e),
            Self::MissingToken => write!(f, "No CSRF token available"),
        }
    }
}

impl std::error::Error for WikidataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::OAuth(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WikidataError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for WikidataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<mediawiki_oauth::OAuthError> for WikidataError {
    fn from(e: mediawiki_oauth::OAuthError) -> Self {
        Self::OAuth(e)
    }
}

/// Result type for Wikidata operations
pub type Result<T> = std::result::Result<T, WikidataError>;
