//! Error types for the MediaWiki OAuth client

use std::fmt;

/// Errors that can occur during the OAuth handshake or while signing requests
#[derive(Debug)]
pub enum OAuthError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Response body was not the JSON we expected
    Json(serde_json::Error),
    /// Wiki answered with a non-success status code
    Status(u16),
    /// Wiki answered with an OAuth error message
    Provider(String),
    /// Callback query string had no `oauth_verifier`
    MissingVerifier,
    /// Callback `oauth_token` does not belong to the pending request token
    TokenMismatch,
    /// The access token is not tied to a logged-in user
    Anonymous,
    /// A configured endpoint is not a valid URL
    InvalidUrl(url::ParseError),
    /// HMAC key could not be initialized
    Signature,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "OAuth HTTP error: {}", e),
            Self::Json(e) => write!(f, "OAuth JSON parse error: {}", e),
            Self::Status(code) => write!(f, "OAuth endpoint returned status {}", code),
            Self::Provider(msg) => write!(f, "OAuth provider error: {}", msg),
            Self::MissingVerifier => write!(f, "OAuth callback is missing oauth_verifier"),
            Self::TokenMismatch => write!(f, "OAuth callback token does not match request token"),
            Self::Anonymous => write!(f, "OAuth identity is anonymous"),
            Self::InvalidUrl(e) => write!(f, "Invalid OAuth endpoint URL: {}", e),
            Self::Signature => write!(f, "Could not compute OAuth signature"),
        }
    }
}

impl std::error::Error for OAuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidUrl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for OAuthError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<url::ParseError> for OAuthError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e)
    }
}

/// Result type for OAuth operations
pub type Result<T> = std::result::Result<T, OAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = OAuthError::Provider("mwoauth-invalid-authorization".to_string());
        assert_eq!(
            format!("{}", err),
            "OAuth provider error: mwoauth-invalid-authorization"
        );
    }

    #[test]
    fn test_status_error_display() {
        let err = OAuthError::Status(503);
        assert_eq!(format!("{}", err), "OAuth endpoint returned status 503");
    }

    #[test]
    fn test_url_error_has_source() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err = OAuthError::from(parse_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
