use std::env;
use std::time::Duration;

use povoconta_sparql::{LanguageCode, Qid};
use tracing::warn;

/// Default museum: Museu Paulista, its tutorial collection and the work the
/// tutorial leaves out of its examples
const DEFAULT_MUSEUMS: &str = "museupaulista=Q56677470:Q56677463:Q56730380";

/// A root collection the tool is set up to browse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Museum {
    /// First path segment of every museum route
    pub slug: String,
    pub root: Qid,
    pub tutorial: Option<Qid>,
    /// Work left out of the tutorial examples
    pub tutorial_excluded: Option<Qid>,
}

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub public_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub oauth_consumer_key: String,
    pub oauth_consumer_secret: String,
    /// `index.php` hosting `Special:OAuth`
    pub oauth_mwuri: String,
    pub wikidata_api_url: String,
    pub wikidata_sparql_url: String,
    pub commons_api_url: String,
    pub user_agent: String,
    pub supported_locales: Vec<LanguageCode>,
    pub default_locale: LanguageCode,
    pub museums: Vec<Museum>,
    pub http_timeout: Duration,
    pub http_max_attempts: u32,
    pub http_retry_delay: Duration,
    pub session_ttl: Duration,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration from any key lookup
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| -> u64 {
            var(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };

        let port = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let cors_origins = var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["http://localhost:8000".to_string()]);

        let supported_locales: Vec<LanguageCode> = var("SUPPORTED_LOCALES")
            .unwrap_or_else(|| "pt-br,pt,en".to_string())
            .split(',')
            .filter_map(|code| LanguageCode::parse(code).ok())
            .collect();

        let default_locale = var("DEFAULT_LOCALE")
            .and_then(|code| LanguageCode::parse(&code).ok())
            .unwrap_or_default();

        let museums = parse_museums(&var("MUSEUMS").unwrap_or_else(|| DEFAULT_MUSEUMS.to_string()));

        Self {
            port,
            public_url: var("PUBLIC_URL"),
            cors_origins,
            oauth_consumer_key: var("OAUTH_CONSUMER_KEY").unwrap_or_default(),
            oauth_consumer_secret: var("OAUTH_CONSUMER_SECRET").unwrap_or_default(),
            oauth_mwuri: var("OAUTH_MWURI")
                .unwrap_or_else(|| "https://www.wikidata.org/w/index.php".to_string()),
            wikidata_api_url: var("WIKIDATA_API_URL")
                .unwrap_or_else(|| "https://www.wikidata.org/w/api.php".to_string()),
            wikidata_sparql_url: var("WIKIDATA_SPARQL_URL")
                .unwrap_or_else(|| "https://query.wikidata.org/sparql".to_string()),
            commons_api_url: var("COMMONS_API_URL")
                .unwrap_or_else(|| "https://commons.wikimedia.org/w/api.php".to_string()),
            user_agent: var("USER_AGENT").unwrap_or_else(|| {
                format!("PovoConta/{} (https://povoconta.toolforge.org)", env!("CARGO_PKG_VERSION"))
            }),
            supported_locales,
            default_locale,
            museums,
            http_timeout: Duration::from_secs(number("HTTP_TIMEOUT_SECS", 30)),
            http_max_attempts: number("HTTP_MAX_ATTEMPTS", 3) as u32,
            http_retry_delay: Duration::from_millis(number("HTTP_RETRY_DELAY_MS", 500)),
            session_ttl: Duration::from_secs(number("SESSION_TTL_SECS", 7 * 24 * 60 * 60)),
        }
    }

    /// Whether the public address is https, so cookies can be marked `Secure`
    pub fn serves_https(&self) -> bool {
        self.public_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"))
    }
}

/// Parse `slug=QID[:tutorialQID[:excludedQID]]` entries separated by commas.
/// Malformed entries are skipped with a warning.
pub fn parse_museums(value: &str) -> Vec<Museum> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let museum = parse_museum(entry);
            if museum.is_none() {
                warn!(entry = %entry, "Ignoring malformed MUSEUMS entry");
            }
            museum
        })
        .collect()
}

fn parse_museum(entry: &str) -> Option<Museum> {
    let (slug, ids) = entry.split_once('=')?;
    let slug = slug.trim();
    if slug.is_empty() || !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    let mut ids = ids.split(':').map(str::trim);
    let root = Qid::parse(ids.next()?).ok()?;
    let optional = |id: Option<&str>| -> Option<Option<Qid>> {
        match id {
            None | Some("") => Some(None),
            Some(id) => Qid::parse(id).ok().map(Some),
        }
    };
    let tutorial = optional(ids.next())?;
    let tutorial_excluded = optional(ids.next())?;
    Some(Museum {
        slug: slug.to_string(),
        root,
        tutorial,
        tutorial_excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_locale.as_str(), "pt-br");
        assert_eq!(config.supported_locales.len(), 3);
        assert_eq!(config.http_max_attempts, 3);
        assert_eq!(config.http_retry_delay, Duration::from_millis(500));
        assert_eq!(config.session_ttl, Duration::from_secs(604_800));
        assert_eq!(config.museums.len(), 1);
        let museum = &config.museums[0];
        assert_eq!(museum.slug, "museupaulista");
        assert_eq!(museum.root.as_str(), "Q56677470");
        assert_eq!(museum.tutorial.as_ref().map(Qid::as_str), Some("Q56677463"));
        assert_eq!(museum.tutorial_excluded.as_ref().map(Qid::as_str), Some("Q56730380"));
    }

    #[test]
    fn test_https_public_url() {
        assert!(config(&[("PUBLIC_URL", "https://povoconta.toolforge.org")]).serves_https());
        assert!(!config(&[("PUBLIC_URL", "http://localhost:8000")]).serves_https());
        assert!(!config(&[]).serves_https());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("SUPPORTED_LOCALES", "en, pt-br, bad'"),
            ("DEFAULT_LOCALE", "en"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.supported_locales.len(), 2);
        assert_eq!(config.default_locale.as_str(), "en");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert!(!config.serves_https());
    }

    #[test]
    fn test_parse_museums() {
        let museums = parse_museums("paulista=Q56677470:Q56677463, ipiranga=Q1,broken=P5, =Q2, solo=Q3::");
        assert_eq!(museums.len(), 3);
        assert_eq!(museums[0].tutorial.as_ref().map(Qid::as_str), Some("Q56677463"));
        assert_eq!(museums[0].tutorial_excluded, None);
        assert_eq!(museums[1].slug, "ipiranga");
        assert_eq!(museums[1].tutorial, None);
        assert_eq!(museums[2].slug, "solo");
    }
}
