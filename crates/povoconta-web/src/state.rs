use std::sync::Arc;

use chrono::{DateTime, Utc};
use mediawiki_oauth::{ConsumerToken, OAuthClient};
use wikidata_client::{ClientConfig, Endpoints, RetryPolicy, WikidataClient};

use crate::config::{Config, Museum};
use crate::error::AppError;
use crate::locale::Locales;
use crate::session::SessionStore;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub wikidata: Arc<WikidataClient>,
    pub oauth: Arc<OAuthClient>,
    pub sessions: SessionStore,
    pub museums: Arc<Vec<Museum>>,
    pub locales: Arc<Locales>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let wikidata = WikidataClient::with_config(ClientConfig {
            endpoints: Endpoints {
                action_api: config.wikidata_api_url.clone(),
                sparql: config.wikidata_sparql_url.clone(),
                commons_api: config.commons_api_url.clone(),
            },
            user_agent: config.user_agent.clone(),
            timeout: config.http_timeout,
            retry: RetryPolicy::new(config.http_max_attempts, config.http_retry_delay),
        });

        // The handshake shares the API client's connection pool and user agent
        let oauth = OAuthClient::with_http(
            wikidata.http().clone(),
            ConsumerToken::new(
                config.oauth_consumer_key.clone(),
                config.oauth_consumer_secret.clone(),
            ),
            &config.oauth_mwuri,
            &config.wikidata_api_url,
        );

        Self {
            wikidata: Arc::new(wikidata),
            oauth: Arc::new(oauth),
            sessions: SessionStore::new(config.session_ttl)
                .with_secure_cookies(config.serves_https()),
            museums: Arc::new(config.museums.clone()),
            locales: Arc::new(Locales::new(
                config.supported_locales.clone(),
                config.default_locale.clone(),
            )),
            started_at: Utc::now(),
        }
    }

    /// The configured museum behind a route's first path segment
    pub fn museum(&self, slug: &str) -> Result<&Museum, AppError> {
        self.museums
            .iter()
            .find(|m| m.slug == slug)
            .ok_or_else(|| AppError::NotFound(format!("Unknown museum: {}", slug)))
    }
}
