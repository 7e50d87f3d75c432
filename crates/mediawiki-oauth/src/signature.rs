//! OAuth 1.0a request signing (HMAC-SHA1, RFC 5849)

use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::error::{OAuthError, Result};
use crate::tokens::{ConsumerToken, TokenCredentials};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string for a request.
///
/// `url` may carry a query string; its pairs are merged into `params` and the
/// URL is normalized (no query, no fragment, no default port).
pub fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(String, String)],
) -> Result<String> {
    let mut parsed = Url::parse(url)?;
    let mut all: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    all.extend(params.iter().cloned());
    parsed.set_query(None);
    parsed.set_fragment(None);

    let mut encoded: Vec<(String, String)> = all
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(parsed.as_str()),
        percent_encode(&normalized)
    ))
}

/// Signs requests with a consumer and, once the handshake has issued one, a token.
#[derive(Debug, Clone)]
pub struct Signer {
    consumer: ConsumerToken,
    token: Option<TokenCredentials>,
}

impl Signer {
    pub fn new(consumer: ConsumerToken, token: Option<TokenCredentials>) -> Self {
        Self { consumer, token }
    }

    /// `Authorization` header value for a request, with a fresh nonce and timestamp.
    ///
    /// `params` are the query or form-body parameters that will be sent.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String> {
        self.authorization_header_with(method, url, params, &[])
    }

    /// Same as [`Signer::authorization_header`], with protocol parameters
    /// such as `oauth_callback` or `oauth_verifier`.
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra_oauth: &[(&str, &str)],
    ) -> Result<String> {
        let oauth = self.sign(
            method,
            url,
            params,
            extra_oauth,
            &generate_nonce(),
            chrono::Utc::now().timestamp(),
        )?;
        Ok(format_header(&oauth))
    }

    /// Compute the full set of `oauth_*` parameters, signature included.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra_oauth: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<Vec<(String, String)>> {
        let mut oauth: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer.key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ];
        if let Some(token) = &self.token {
            oauth.push(("oauth_token".into(), token.key.clone()));
        }
        for (k, v) in extra_oauth {
            oauth.push(((*k).to_string(), (*v).to_string()));
        }

        let mut signed_params = params.to_vec();
        signed_params.extend(oauth.iter().cloned());
        let base = signature_base_string(method, url, &signed_params)?;

        let token_secret = self.token.as_ref().map(|t| t.secret.as_str()).unwrap_or("");
        let signature = hmac_sha1(&self.consumer.secret, token_secret, &base)?;
        oauth.push(("oauth_signature".into(), signature));
        Ok(oauth)
    }
}

fn hmac_sha1(consumer_secret: &str, token_secret: &str, base: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| OAuthError::Signature)?;
    mac.update(base.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

fn format_header(oauth: &[(String, String)]) -> String {
    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {}", fields)
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}
