//! Handshake client for `Special:OAuth`

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{OAuthError, Result};
use crate::signature::Signer;
use crate::tokens::{AccessToken, ConsumerToken, RequestToken, TokenCredentials};

/// Who authorized the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub user_id: Option<u64>,
}

/// Client for a MediaWiki OAuth provider
pub struct OAuthClient {
    http: reqwest::Client,
    consumer: ConsumerToken,
    index_url: String,
    api_url: String,
}

impl OAuthClient {
    /// `index.php` of the wiki hosting `Special:OAuth`
    pub const DEFAULT_INDEX_URL: &'static str = "https://www.wikidata.org/w/index.php";
    /// `api.php` of the same wiki, used for identity lookups
    pub const DEFAULT_API_URL: &'static str = "https://www.wikidata.org/w/api.php";

    pub fn new(consumer: ConsumerToken, index_url: &str, api_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self::with_http(http, consumer, index_url, api_url)
    }

    /// Build a client around an existing `reqwest::Client` (shared pool, user agent, timeout)
    pub fn with_http(
        http: reqwest::Client,
        consumer: ConsumerToken,
        index_url: &str,
        api_url: &str,
    ) -> Self {
        Self {
            http,
            consumer,
            index_url: index_url.to_string(),
            api_url: api_url.to_string(),
        }
    }

    /// Request a temporary token and build the authorization URL the user must visit.
    ///
    /// MediaWiki only accepts the callback registered with the consumer, so
    /// the protocol-level callback is always `oob`.
    pub async fn initiate(&self) -> Result<(String, RequestToken)> {
        let params = vec![
            ("title".to_string(), "Special:OAuth/initiate".to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        let body = self
            .signed_get(&self.index_url, &params, None, &[("oauth_callback", "oob")])
            .await?;
        let credentials = parse_credentials(&body)?;
        let request_token = RequestToken::new(credentials.key, credentials.secret);
        let redirect = self.authorize_url(&request_token)?;
        debug!(token = %request_token.key, "OAuth request token issued");
        Ok((redirect, request_token))
    }

    /// URL of `Special:OAuth/authorize` for a request token
    pub fn authorize_url(&self, request_token: &RequestToken) -> Result<String> {
        let url = Url::parse_with_params(
            &self.index_url,
            &[
                ("title", "Special:OAuth/authorize"),
                ("oauth_token", request_token.key.as_str()),
                ("oauth_consumer_key", self.consumer.key.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange the verifier from the callback query string for an access token.
    pub async fn complete(
        &self,
        request_token: &RequestToken,
        query_string: &str,
    ) -> Result<AccessToken> {
        let verifier = verify_callback(request_token, query_string)?;
        let params = vec![
            ("title".to_string(), "Special:OAuth/token".to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        let body = self
            .signed_get(
                &self.index_url,
                &params,
                Some(request_token.credentials()),
                &[("oauth_verifier", verifier.as_str())],
            )
            .await?;
        let credentials = parse_credentials(&body)?;
        Ok(AccessToken::new(credentials.key, credentials.secret))
    }

    /// Look up the user behind an access token (`meta=userinfo`).
    pub async fn identify(&self, access_token: &AccessToken) -> Result<Identity> {
        let params = vec![
            ("action".to_string(), "query".to_string()),
            ("meta".to_string(), "userinfo".to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        let body = self
            .signed_get(&self.api_url, &params, Some(access_token.credentials()), &[])
            .await?;
        parse_identity(&body)
    }

    /// Signer for authenticated API calls on behalf of a user
    pub fn signer(&self, access_token: &AccessToken) -> Signer {
        Signer::new(self.consumer.clone(), Some(access_token.credentials()))
    }

    async fn signed_get(
        &self,
        url: &str,
        params: &[(String, String)],
        token: Option<TokenCredentials>,
        extra_oauth: &[(&str, &str)],
    ) -> Result<Value> {
        let signer = Signer::new(self.consumer.clone(), token);
        let header = signer.authorization_header_with("GET", url, params, extra_oauth)?;

        let response = self
            .http
            .get(url)
            .query(params)
            .header(AUTHORIZATION, header)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "OAuth endpoint returned error status");
            return Err(OAuthError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Check the callback query string against the pending request token and
/// return the verifier.
fn verify_callback(request_token: &RequestToken, query_string: &str) -> Result<String> {
    let query = query_string.trim_start_matches('?');
    let mut verifier = None;
    let mut token = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "oauth_verifier" => verifier = Some(value.into_owned()),
            "oauth_token" => token = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(token) = token {
        if token != request_token.key {
            return Err(OAuthError::TokenMismatch);
        }
    }
    verifier
        .filter(|v| !v.is_empty())
        .ok_or(OAuthError::MissingVerifier)
}

fn parse_credentials(body: &Value) -> Result<TokenCredentials> {
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(OAuthError::Provider(message));
    }
    match (body["key"].as_str(), body["secret"].as_str()) {
        (Some(key), Some(secret)) => Ok(TokenCredentials {
            key: key.to_string(),
            secret: secret.to_string(),
        }),
        _ => Err(OAuthError::Provider(format!(
            "unexpected token response: {}",
            body
        ))),
    }
}

fn parse_identity(body: &Value) -> Result<Identity> {
    if let Some(info) = body["error"]["info"].as_str() {
        return Err(OAuthError::Provider(info.to_string()));
    }
    let userinfo = &body["query"]["userinfo"];
    if userinfo.get("anon").is_some() {
        return Err(OAuthError::Anonymous);
    }
    let username = userinfo["name"]
        .as_str()
        .ok_or_else(|| OAuthError::Provider("userinfo has no name".to_string()))?;
    Ok(Identity {
        username: username.to_string(),
        user_id: userinfo["id"].as_u64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn test_client(index_url: &str) -> OAuthClient {
        OAuthClient::new(
            ConsumerToken::new("consumer", "consumer-secret"),
            index_url,
            OAuthClient::DEFAULT_API_URL,
        )
    }

    async fn fake_index(
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !auth.starts_with("OAuth ") {
            return Json(json!({ "error": "missing header" }));
        }
        match params.get("title").map(String::as_str) {
            Some("Special:OAuth/initiate") if auth.contains("oauth_callback=\"oob\"") => {
                Json(json!({ "key": "req-key", "secret": "req-secret", "oauth_callback_confirmed": "true" }))
            }
            Some("Special:OAuth/token") if auth.contains("oauth_verifier=\"v123\"") => {
                Json(json!({ "key": "acc-key", "secret": "acc-secret" }))
            }
            _ => Json(json!({ "error": "mwoauth-invalid-authorization" })),
        }
    }

    async fn spawn_fake_wiki() -> String {
        let app = Router::new().route("/w/index.php", get(fake_index));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/w/index.php", addr)
    }

    #[test]
    fn test_authorize_url() {
        let client = test_client(OAuthClient::DEFAULT_INDEX_URL);
        let url = client
            .authorize_url(&RequestToken::new("abc", "def"))
            .unwrap();
        assert_eq!(
            url,
            "https://www.wikidata.org/w/index.php?title=Special%3AOAuth%2Fauthorize&oauth_token=abc&oauth_consumer_key=consumer"
        );
    }

    #[test]
    fn test_verify_callback_accepts_matching_token() {
        let token = RequestToken::new("abc", "def");
        let verifier = verify_callback(&token, "oauth_verifier=xyz&oauth_token=abc").unwrap();
        assert_eq!(verifier, "xyz");
    }

    #[test]
    fn test_verify_callback_rejects_other_token() {
        let token = RequestToken::new("abc", "def");
        let err = verify_callback(&token, "oauth_verifier=xyz&oauth_token=zzz").unwrap_err();
        assert!(matches!(err, OAuthError::TokenMismatch));
    }

    #[test]
    fn test_verify_callback_requires_verifier() {
        let token = RequestToken::new("abc", "def");
        let err = verify_callback(&token, "?oauth_token=abc").unwrap_err();
        assert!(matches!(err, OAuthError::MissingVerifier));
    }

    #[test]
    fn test_parse_credentials_error_body() {
        let err = parse_credentials(&json!({ "error": "mwoauth-consumer-not-approved" }))
            .unwrap_err();
        assert!(matches!(err, OAuthError::Provider(ref m) if m == "mwoauth-consumer-not-approved"));
    }

    #[test]
    fn test_parse_identity() {
        let identity = parse_identity(&json!({
            "batchcomplete": "",
            "query": { "userinfo": { "id": 42, "name": "Volunteer" } }
        }))
        .unwrap();
        assert_eq!(identity.username, "Volunteer");
        assert_eq!(identity.user_id, Some(42));
    }

    #[test]
    fn test_parse_identity_anonymous() {
        let err = parse_identity(&json!({
            "query": { "userinfo": { "id": 0, "name": "127.0.0.1", "anon": "" } }
        }))
        .unwrap_err();
        assert!(matches!(err, OAuthError::Anonymous));
    }

    #[tokio::test]
    async fn test_initiate_and_complete_against_fake_wiki() {
        let index_url = spawn_fake_wiki().await;
        let client = test_client(&index_url);

        let (redirect, request_token) = client.initiate().await.unwrap();
        assert_eq!(request_token, RequestToken::new("req-key", "req-secret"));
        assert!(redirect.contains("oauth_token=req-key"));

        let access = client
            .complete(&request_token, "oauth_verifier=v123&oauth_token=req-key")
            .await
            .unwrap();
        assert_eq!(access, AccessToken::new("acc-key", "acc-secret"));
    }

    #[tokio::test]
    async fn test_complete_with_wrong_verifier_is_provider_error() {
        let index_url = spawn_fake_wiki().await;
        let client = test_client(&index_url);
        let err = client
            .complete(
                &RequestToken::new("req-key", "req-secret"),
                "oauth_verifier=nope&oauth_token=req-key",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::Provider(_)));
    }
}
