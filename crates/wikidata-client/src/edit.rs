//! OAuth-signed qualifier edits

use mediawiki_oauth::Signer;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::WikidataClient;
use crate::error::{Result, WikidataError};

/// Quantity (amount qualifier)
pub const PROP_QUANTITY: &str = "P1114";

/// Token MediaWiki hands out to anonymous sessions
const ANONYMOUS_TOKEN: &str = "+\\";

/// A quantity qualifier to create or update on a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierChange {
    pub statement_id: String,
    pub property: String,
    pub amount: u64,
    /// Hash of the existing qualifier snak; `None` creates a new qualifier
    pub snak_hash: Option<String>,
    pub summary: Option<String>,
}

impl QualifierChange {
    pub fn quantity(statement_id: &str, amount: u64, snak_hash: Option<&str>) -> Self {
        Self {
            statement_id: statement_id.to_string(),
            property: PROP_QUANTITY.to_string(),
            amount,
            snak_hash: snak_hash.filter(|h| !h.is_empty()).map(str::to_string),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn is_update(&self) -> bool {
        self.snak_hash.is_some()
    }

    /// `wbsetqualifier` parameters for this change
    pub fn to_params(&self, token: &str) -> Vec<(String, String)> {
        let value = json!({ "amount": format!("+{}", self.amount), "unit": "1" });
        let mut params = vec![
            ("action".to_string(), "wbsetqualifier".to_string()),
            ("claim".to_string(), self.statement_id.clone()),
            ("property".to_string(), self.property.clone()),
            ("snaktype".to_string(), "value".to_string()),
            ("value".to_string(), value.to_string()),
        ];
        if let Some(hash) = &self.snak_hash {
            params.push(("snakhash".to_string(), hash.clone()));
        }
        if let Some(summary) = &self.summary {
            params.push(("summary".to_string(), summary.clone()));
        }
        params.push(("assert".to_string(), "user".to_string()));
        params.push(("format".to_string(), "json".to_string()));
        params.push(("token".to_string(), token.to_string()));
        params
    }
}

/// Authenticated editor bound to one user's OAuth credentials
pub struct Editor<'a> {
    client: &'a WikidataClient,
    signer: Signer,
}

impl<'a> Editor<'a> {
    pub(crate) fn new(client: &'a WikidataClient, signer: Signer) -> Self {
        Self { client, signer }
    }

    /// Fetch a fresh CSRF token for the next write
    pub async fn csrf_token(&self) -> Result<String> {
        let params = vec![
            ("action".to_string(), "query".to_string()),
            ("meta".to_string(), "tokens".to_string()),
            ("type".to_string(), "csrf".to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        let body = self.signed("GET", &params).await?;
        match body.pointer("/query/tokens/csrftoken").and_then(Value::as_str) {
            Some(token) if token != ANONYMOUS_TOKEN => Ok(token.to_string()),
            _ => Err(WikidataError::MissingToken),
        }
    }

    /// Create or update a qualifier, fetching a fresh token first
    pub async fn set_qualifier(&self, change: &QualifierChange) -> Result<Value> {
        let token = self.csrf_token().await?;
        let params = change.to_params(&token);
        debug!(
            statement = %change.statement_id,
            update = change.is_update(),
            amount = change.amount,
            "wbsetqualifier"
        );
        let body = self.signed("POST", &params).await?;
        info!(statement = %change.statement_id, amount = change.amount, "Qualifier saved");
        Ok(body)
    }

    /// Remove one qualifier snak from a statement
    pub async fn remove_qualifier(&self, statement_id: &str, snak_hash: &str) -> Result<Value> {
        let token = self.csrf_token().await?;
        let params = vec![
            ("action".to_string(), "wbremovequalifiers".to_string()),
            ("claim".to_string(), statement_id.to_string()),
            ("qualifiers".to_string(), snak_hash.to_string()),
            ("assert".to_string(), "user".to_string()),
            ("format".to_string(), "json".to_string()),
            ("token".to_string(), token),
        ];
        let body = self.signed("POST", &params).await?;
        info!(statement = %statement_id, "Qualifier removed");
        Ok(body)
    }

    async fn signed(&self, method: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.client.endpoints().action_api.as_str();
        let header = self.signer.authorization_header(method, url, params)?;
        let http = self.client.http();
        let request = if method == "POST" {
            http.post(url).form(params)
        } else {
            http.get(url).query(params)
        };
        let response = request.header(AUTHORIZATION, header).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WikidataError::Status(status.as_u16()));
        }
        let body: Value = serde_json::from_str(&response.text().await?)?;
        check_api_error(body)
    }
}

fn check_api_error(body: Value) -> Result<Value> {
    match body.get("error") {
        Some(error) => Err(WikidataError::Api {
            code: error["code"].as_str().unwrap_or("unknown").to_string(),
            info: error["info"].as_str().unwrap_or_default().to_string(),
        }),
        None => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Form, State};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::Router;
    use mediawiki_oauth::{AccessToken, ConsumerToken};

    use crate::client::{ClientConfig, Endpoints};
    use crate::retry::RetryPolicy;

    /// What the fake `api.php` saw
    #[derive(Default)]
    struct Seen {
        token_requests: u32,
        authorization: Vec<String>,
        writes: Vec<HashMap<String, String>>,
    }

    type Shared = Arc<Mutex<Seen>>;

    fn authorization(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn fresh_token(State(seen): State<Shared>, headers: HeaderMap) -> String {
        let mut seen = seen.lock().unwrap();
        seen.token_requests += 1;
        seen.authorization.push(authorization(&headers));
        format!(
            r#"{{ "query": {{ "tokens": {{ "csrftoken": "t{}+\\" }} }} }}"#,
            seen.token_requests
        )
    }

    async fn anonymous_token(State(seen): State<Shared>) -> &'static str {
        seen.lock().unwrap().token_requests += 1;
        r#"{ "query": { "tokens": { "csrftoken": "+\\" } } }"#
    }

    async fn write(
        State(seen): State<Shared>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> String {
        let mut seen = seen.lock().unwrap();
        seen.authorization.push(authorization(&headers));
        let rejected = form.get("claim").map(String::as_str) == Some("Q1$locked");
        seen.writes.push(form);
        if rejected {
            r#"{ "error": { "code": "protectedpage", "info": "This page is protected." } }"#.to_string()
        } else {
            r#"{ "success": 1 }"#.to_string()
        }
    }

    async fn fake_wiki(token: Router<Shared>) -> (WikidataClient, Shared) {
        let seen = Shared::default();
        let app = token.with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let base = format!("http://{addr}");
        let client = WikidataClient::with_config(ClientConfig {
            endpoints: Endpoints {
                action_api: format!("{base}/w/api.php"),
                sparql: format!("{base}/sparql"),
                commons_api: format!("{base}/commons/api.php"),
            },
            retry: RetryPolicy::none(),
            ..ClientConfig::default()
        });
        (client, seen)
    }

    fn signer() -> Signer {
        Signer::new(
            ConsumerToken::new("consumer", "consumer-secret"),
            Some(AccessToken::new("access", "access-secret").credentials()),
        )
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_update_carries_snakhash() {
        let change = QualifierChange::quantity("Q123$abc-guid", 5, Some("HASH1"));
        assert!(change.is_update());
        let params = change.to_params("tok+\\");
        assert_eq!(param(&params, "action"), Some("wbsetqualifier"));
        assert_eq!(param(&params, "claim"), Some("Q123$abc-guid"));
        assert_eq!(param(&params, "property"), Some("P1114"));
        assert_eq!(param(&params, "snakhash"), Some("HASH1"));
        assert_eq!(param(&params, "token"), Some("tok+\\"));
        let value: Value = serde_json::from_str(param(&params, "value").unwrap()).unwrap();
        assert_eq!(value, json!({ "amount": "+5", "unit": "1" }));
    }

    #[test]
    fn test_create_has_no_snakhash() {
        let change = QualifierChange::quantity("Q123$abc-guid", 2, None);
        assert!(!change.is_update());
        assert_eq!(param(&change.to_params("t"), "snakhash"), None);

        // An empty hash segment also means create
        let change = QualifierChange::quantity("Q123$abc-guid", 2, Some(""));
        assert_eq!(param(&change.to_params("t"), "snakhash"), None);
    }

    #[test]
    fn test_summary_is_passed() {
        let change = QualifierChange::quantity("Q1$x", 1, None).with_summary("#povoconta");
        assert_eq!(param(&change.to_params("t"), "summary"), Some("#povoconta"));
    }

    #[test]
    fn test_check_api_error() {
        let err = check_api_error(json!({
            "error": { "code": "badtoken", "info": "Invalid CSRF token." }
        }))
        .unwrap_err();
        assert!(matches!(err, WikidataError::Api { ref code, .. } if code == "badtoken"));
        assert!(check_api_error(json!({ "success": 1 })).is_ok());
    }

    #[tokio::test]
    async fn test_each_write_fetches_a_fresh_token() {
        let (client, seen) =
            fake_wiki(Router::new().route("/w/api.php", get(fresh_token).post(write))).await;
        let editor = client.editor(signer());

        let update = QualifierChange::quantity("Q1$a", 4, Some("HASH1")).with_summary("#povoconta");
        editor.set_qualifier(&update).await.unwrap();
        editor
            .set_qualifier(&QualifierChange::quantity("Q1$b", 2, None))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.token_requests, 2);
        assert_eq!(seen.writes.len(), 2);
        assert_eq!(seen.writes[0]["action"], "wbsetqualifier");
        assert_eq!(seen.writes[0]["claim"], "Q1$a");
        assert_eq!(seen.writes[0]["snakhash"], "HASH1");
        assert_eq!(seen.writes[0]["token"], "t1+\\");
        assert_eq!(seen.writes[0]["summary"], "#povoconta");
        assert!(!seen.writes[1].contains_key("snakhash"));
        assert_eq!(seen.writes[1]["token"], "t2+\\");
        for header in &seen.authorization {
            assert!(header.starts_with("OAuth "), "{header}");
            assert!(header.contains("oauth_token=\"access\""));
            assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        }
    }

    #[tokio::test]
    async fn test_remove_qualifier_posts_hash() {
        let (client, seen) =
            fake_wiki(Router::new().route("/w/api.php", get(fresh_token).post(write))).await;
        client
            .editor(signer())
            .remove_qualifier("Q1$a", "HASH1")
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.writes[0]["action"], "wbremovequalifiers");
        assert_eq!(seen.writes[0]["qualifiers"], "HASH1");
        assert_eq!(seen.writes[0]["token"], "t1+\\");
    }

    #[tokio::test]
    async fn test_anonymous_token_is_missing_token() {
        let (client, seen) =
            fake_wiki(Router::new().route("/w/api.php", get(anonymous_token).post(write))).await;
        let err = client
            .editor(signer())
            .set_qualifier(&QualifierChange::quantity("Q1$a", 1, None))
            .await
            .unwrap_err();

        assert!(matches!(err, WikidataError::MissingToken));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.token_requests, 1);
        assert!(seen.writes.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_body_is_api_error() {
        let (client, _seen) =
            fake_wiki(Router::new().route("/w/api.php", get(fresh_token).post(write))).await;
        let err = client
            .editor(signer())
            .set_qualifier(&QualifierChange::quantity("Q1$locked", 1, None))
            .await
            .unwrap_err();

        assert!(matches!(err, WikidataError::Api { ref code, .. } if code == "protectedpage"));
    }
}
