//! OAuth 1.0a consumer for MediaWiki
//!
//! Implements the three-legged handshake against a wiki's `Special:OAuth`
//! pages and HMAC-SHA1 request signing for authenticated API calls.
//!
//! # Example
//!
//! ```no_run
//! use mediawiki_oauth::{ConsumerToken, OAuthClient};
//!
//! # async fn example() -> Result<(), mediawiki_oauth::OAuthError> {
//! let client = OAuthClient::new(
//!     ConsumerToken::new("consumer-key", "consumer-secret"),
//!     OAuthClient::DEFAULT_INDEX_URL,
//!     OAuthClient::DEFAULT_API_URL,
//! );
//!
//! // Step 1: get a request token and send the user to the wiki
//! let (redirect, request_token) = client.initiate().await?;
//! println!("authorize at {redirect}");
//!
//! // Step 2: the wiki redirects back with `oauth_verifier` in the query string
//! let access_token = client
//!     .complete(&request_token, "oauth_verifier=abc&oauth_token=def")
//!     .await?;
//!
//! // Step 3: find out who authorized us
//! let identity = client.identify(&access_token).await?;
//! println!("logged in as {}", identity.username);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod signature;
mod tokens;

pub use client::{Identity, OAuthClient};
pub use error::{OAuthError, Result};
pub use signature::{percent_encode, signature_base_string, Signer};
pub use tokens::{AccessToken, ConsumerToken, RequestToken, TokenCredentials};
