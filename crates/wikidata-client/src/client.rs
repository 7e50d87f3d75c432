use std::collections::HashMap;
use std::time::Duration;

use mediawiki_oauth::Signer;
use tracing::{debug, warn};

use crate::commons::parse_image_url;
use crate::edit::Editor;
use crate::entities::{parse_entities, parse_search, DepictedSubject, Entity, SearchHit};
use crate::error::{Result, WikidataError};
use crate::fetched::Fetched;
use crate::retry::RetryPolicy;
use crate::sparql::{parse_sparql_response, Binding};

/// `wbgetentities` accepts at most this many ids per call
const ENTITY_BATCH: usize = 50;

/// Upstream base URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Wikidata `api.php`
    pub action_api: String,
    /// Wikidata Query Service
    pub sparql: String,
    /// Commons `api.php`
    pub commons_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            action_api: WikidataClient::ACTION_API_URL.to_string(),
            sparql: WikidataClient::SPARQL_URL.to_string(),
            commons_api: WikidataClient::COMMONS_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            user_agent: concat!("povoconta/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Client for Wikidata reads and Commons image lookups
#[derive(Clone)]
pub struct WikidataClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    retry: RetryPolicy,
}

impl WikidataClient {
    const ACTION_API_URL: &'static str = "https://www.wikidata.org/w/api.php";
    const SPARQL_URL: &'static str = "https://query.wikidata.org/sparql";
    const COMMONS_API_URL: &'static str = "https://commons.wikimedia.org/w/api.php";

    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            endpoints: config.endpoints,
            retry: config.retry,
        }
    }

    /// Shared connection pool, also used for OAuth requests
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Run a SELECT query against the query service.
    pub async fn sparql(&self, query: &str) -> Result<Fetched<Vec<Binding>>> {
        let params = [("query", query), ("format", "json")];
        let body = self
            .retry
            .run(|| async {
                let response = self
                    .http
                    .post(&self.endpoints.sparql)
                    .header(reqwest::header::ACCEPT, "application/sparql-results+json")
                    .form(&params)
                    .send()
                    .await?;
                read_body(response).await
            })
            .await?;
        let rows = parse_sparql_response(&body);
        if let Fetched::Malformed(reason) = &rows {
            warn!(reason = %reason, "Malformed SPARQL response");
        }
        Ok(rows)
    }

    /// `wbgetentities` for up to 50 ids
    pub async fn entities(
        &self,
        ids: &[&str],
        props: &str,
        languages: &[&str],
    ) -> Result<Fetched<HashMap<String, Entity>>> {
        if ids.is_empty() {
            return Ok(Fetched::Empty);
        }
        let ids = ids.join("|");
        let languages = languages.join("|");
        let mut params = vec![
            ("action", "wbgetentities"),
            ("ids", ids.as_str()),
            ("props", props),
            ("format", "json"),
        ];
        if !languages.is_empty() {
            params.push(("languages", languages.as_str()));
        }
        let body = self.get_text(&self.endpoints.action_api, &params).await?;
        let entities = parse_entities(&body);
        if let Fetched::Malformed(reason) = &entities {
            warn!(ids = %ids, reason = %reason, "Malformed wbgetentities response");
        }
        Ok(entities)
    }

    pub async fn entity(&self, qid: &str, props: &str) -> Result<Fetched<Entity>> {
        Ok(self
            .entities(&[qid], props, &[])
            .await?
            .and_then(|mut map| Fetched::from(map.remove(qid))))
    }

    /// Label of `qid`: requested language, then `pt-br`, `pt`, `en`, then the QID.
    pub async fn get_name(&self, qid: &str, lang: &str) -> Result<String> {
        let labels = self.labels(&[qid], lang).await?;
        Ok(labels
            .get(qid)
            .cloned()
            .unwrap_or_else(|| qid.to_string()))
    }

    /// Labels for many ids, batched by 50. Unknown ids map to themselves.
    pub async fn labels(&self, qids: &[&str], lang: &str) -> Result<HashMap<String, String>> {
        let mut out = HashMap::with_capacity(qids.len());
        for chunk in qids.chunks(ENTITY_BATCH) {
            let entities = self.entities(chunk, "labels", &[]).await?.or_default();
            for qid in chunk {
                let label = entities
                    .get(*qid)
                    .map(|entity| entity.label(lang))
                    .unwrap_or_else(|| qid.to_string());
                out.insert(qid.to_string(), label);
            }
        }
        Ok(out)
    }

    /// Current Commons URL of the item's P18 image.
    pub async fn get_p18(&self, qid: &str) -> Result<Fetched<String>> {
        let filename = match self.entity(qid, "claims").await? {
            Fetched::Found(entity) => entity.p18_filename().map(str::to_string),
            Fetched::Empty => None,
            Fetched::Malformed(reason) => return Ok(Fetched::Malformed(reason)),
        };
        match filename {
            Some(name) => self.image_url(&name).await,
            None => {
                debug!(qid = %qid, "No P18 image");
                Ok(Fetched::Empty)
            }
        }
    }

    /// Commons `imageinfo` URL for `File:<filename>`
    pub async fn image_url(&self, filename: &str) -> Result<Fetched<String>> {
        let title = format!("File:{filename}");
        let params = [
            ("action", "query"),
            ("titles", title.as_str()),
            ("prop", "imageinfo"),
            ("iiprop", "url"),
            ("format", "json"),
        ];
        let body = self.get_text(&self.endpoints.commons_api, &params).await?;
        let url = parse_image_url(&body);
        if let Fetched::Malformed(reason) = &url {
            warn!(file = %filename, reason = %reason, "Malformed imageinfo response");
        }
        Ok(url)
    }

    /// P180 statements of a work with quantities, hashes and subject labels.
    pub async fn get_p180(&self, qid: &str, lang: &str) -> Result<Fetched<Vec<DepictedSubject>>> {
        let claims = match self.entity(qid, "claims").await? {
            Fetched::Found(entity) => entity.depicted_claims(),
            Fetched::Empty => return Ok(Fetched::Empty),
            Fetched::Malformed(reason) => return Ok(Fetched::Malformed(reason)),
        };
        if claims.is_empty() {
            return Ok(Fetched::Empty);
        }
        let subject_ids: Vec<&str> = claims.iter().map(|c| c.qid.as_str()).collect();
        let labels = self.labels(&subject_ids, lang).await?;
        let subjects = claims
            .into_iter()
            .map(|claim| {
                let label = labels
                    .get(&claim.qid)
                    .cloned()
                    .unwrap_or_else(|| claim.qid.clone());
                DepictedSubject::from_claim(claim, label)
            })
            .collect();
        Ok(Fetched::Found(subjects))
    }

    /// `wbsearchentities` for items
    pub async fn search(&self, term: &str, lang: &str, limit: u32) -> Result<Fetched<Vec<SearchHit>>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Fetched::Empty);
        }
        let limit = limit.to_string();
        let params = [
            ("action", "wbsearchentities"),
            ("search", term),
            ("language", lang),
            ("uselang", lang),
            ("type", "item"),
            ("limit", limit.as_str()),
            ("format", "json"),
        ];
        let body = self.get_text(&self.endpoints.action_api, &params).await?;
        Ok(parse_search(&body))
    }

    /// Editor signing requests with one user's access token
    pub fn editor(&self, signer: Signer) -> Editor<'_> {
        Editor::new(self, signer)
    }

    async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        self.retry
            .run(|| async {
                let response = self.http.get(url).query(params).send().await?;
                read_body(response).await
            })
            .await
    }
}

impl Default for WikidataClient {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        warn!(status = %status, url = %response.url(), "Upstream returned error status");
        return Err(WikidataError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base: &str) -> WikidataClient {
        WikidataClient::with_config(ClientConfig {
            endpoints: Endpoints {
                action_api: format!("{base}/w/api.php"),
                sparql: format!("{base}/sparql"),
                commons_api: format!("{base}/commons/api.php"),
            },
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
            ..ClientConfig::default()
        })
    }

    async fn fake_api(Query(q): Query<HashMap<String, String>>) -> String {
        match (q.get("action").map(String::as_str), q.get("ids").map(String::as_str)) {
            (Some("wbgetentities"), Some("Q100")) => r#"{ "entities": { "Q100": {
                "id": "Q100",
                "claims": {
                    "P18": [ { "id": "Q100$i", "mainsnak": { "snaktype": "value", "property": "P18",
                        "datavalue": { "type": "string", "value": "Quadro.jpg" } } } ],
                    "P180": [ { "id": "Q100$A", "mainsnak": { "snaktype": "value", "property": "P180",
                        "datavalue": { "type": "wikibase-entityid", "value": { "id": "Q726" } } } } ]
                } } } }"#
                .to_string(),
            (Some("wbgetentities"), Some("Q726")) => r#"{ "entities": { "Q726": {
                "id": "Q726", "labels": { "pt": { "language": "pt", "value": "cavalo" } } } } }"#
                .to_string(),
            (Some("wbgetentities"), Some(id)) => {
                format!(r#"{{ "entities": {{ "{id}": {{ "id": "{id}", "missing": "" }} }} }}"#)
            }
            _ => r#"{ "error": { "code": "unknown_action" } }"#.to_string(),
        }
    }

    async fn fake_commons(Query(q): Query<HashMap<String, String>>) -> String {
        assert_eq!(q.get("titles").map(String::as_str), Some("File:Quadro.jpg"));
        r#"{ "query": { "pages": { "7": { "imageinfo": [
            { "url": "https://upload.wikimedia.org/Quadro.jpg" } ] } } } }"#
            .to_string()
    }

    #[tokio::test]
    async fn test_get_p18_two_steps() {
        let app = Router::new()
            .route("/w/api.php", get(fake_api))
            .route("/commons/api.php", get(fake_commons));
        let client = client_for(&serve(app).await);

        let url = client.get_p18("Q100").await.unwrap();
        assert_eq!(
            url,
            Fetched::Found("https://upload.wikimedia.org/Quadro.jpg".to_string())
        );
        assert!(client.get_p18("Q404").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_p180_with_labels() {
        let app = Router::new().route("/w/api.php", get(fake_api));
        let client = client_for(&serve(app).await);

        let subjects = client.get_p180("Q100", "pt-br").await.unwrap().found().unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].qid, "Q726");
        assert_eq!(subjects[0].label, "cavalo");
        assert_eq!(subjects[0].statement_id, "Q100$A");
    }

    #[tokio::test]
    async fn test_get_name_falls_back_to_qid() {
        let app = Router::new().route("/w/api.php", get(fake_api));
        let client = client_for(&serve(app).await);

        assert_eq!(client.get_name("Q726", "en").await.unwrap(), "cavalo");
        assert_eq!(client.get_name("Q999", "en").await.unwrap(), "Q999");
    }

    #[tokio::test]
    async fn test_sparql_retries_on_503() {
        let calls = Arc::new(AtomicU32::new(0));
        let app = Router::new()
            .route(
                "/sparql",
                axum::routing::post(|State(calls): State<Arc<AtomicU32>>, body: String| async move {
                    assert!(body.contains("format=json"));
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        return (StatusCode::SERVICE_UNAVAILABLE, String::new());
                    }
                    (
                        StatusCode::OK,
                        r#"{ "results": { "bindings": [
                            { "work": { "type": "uri", "value": "http://www.wikidata.org/entity/Q1" } }
                        ] } }"#
                            .to_string(),
                    )
                }),
            )
            .with_state(calls.clone());
        let client = client_for(&serve(app).await);

        let rows = client.sparql("SELECT ?work WHERE {}").await.unwrap();
        assert_eq!(rows.found().unwrap().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sparql_client_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let app = Router::new()
            .route(
                "/sparql",
                axum::routing::post(|State(calls): State<Arc<AtomicU32>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    StatusCode::BAD_REQUEST
                }),
            )
            .with_state(calls.clone());
        let client = client_for(&serve(app).await);

        let err = client.sparql("SELEC").await.unwrap_err();
        assert!(matches!(err, WikidataError::Status(400)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_configured_user_agent_is_sent() {
        let app = Router::new().route(
            "/sparql",
            axum::routing::post(|headers: HeaderMap| async move {
                let agent = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                format!(
                    r#"{{ "results": {{ "bindings": [
                        {{ "agent": {{ "type": "literal", "value": "{agent}" }} }}
                    ] }} }}"#
                )
            }),
        );
        let base = serve(app).await;
        let client = WikidataClient::with_config(ClientConfig {
            endpoints: Endpoints {
                action_api: format!("{base}/w/api.php"),
                sparql: format!("{base}/sparql"),
                commons_api: format!("{base}/commons/api.php"),
            },
            user_agent: "povoconta-test/1.0 (ops@example.org)".to_string(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::none(),
        });

        let rows = client.sparql("SELECT ?agent WHERE {}").await.unwrap();
        assert_eq!(
            rows.found().unwrap()[0]["agent"].value,
            "povoconta-test/1.0 (ops@example.org)"
        );
    }

    #[tokio::test]
    async fn test_search_blank_term_skips_request() {
        let client = client_for("http://127.0.0.1:9");
        assert!(client.search("   ", "pt-br", 10).await.unwrap().is_empty());
    }
}
