pub mod browse;
pub mod health;
pub mod home;
pub mod oauth;
pub mod search;
pub mod tutorial;
pub mod works;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use povoconta_sparql::{LanguageCode, Vocabulary};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health))
        // Home and account
        .route("/", get(home::home))
        .route("/me", get(oauth::me))
        .route("/login", get(oauth::login))
        .route("/oauth-callback", get(oauth::callback))
        .route("/logout", get(oauth::logout))
        .route("/search", get(search::search))
        // Museums
        .route("/{museum}", get(browse::museum))
        .route("/{museum}/tutorial", get(tutorial::tutorial))
        .route("/{museum}/p195", get(browse::collections))
        .route("/{museum}/p195/{qid}", get(browse::collection))
        .route("/{museum}/p170", get(browse::creators))
        .route("/{museum}/p170/{qid}", get(browse::creator))
        .route("/{museum}/p571", get(browse::decades))
        .route("/{museum}/p571/{decade}", get(browse::decade))
        .route("/{museum}/p31", get(browse::instances))
        .route("/{museum}/p31/{qid}", get(browse::instance))
        .route("/{museum}/p180", get(browse::depicts))
        .route("/{museum}/p180/{qid}", get(browse::depict))
        // Works
        .route("/{museum}/qid/{qid}", get(works::detail))
        .route("/{museum}/next/{qid}", get(works::next))
        .route("/{museum}/save/{qid}", post(works::save))
        .route("/{museum}/remove/{qid}", post(works::remove))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    lang: Option<String>,
    goback: Option<String>,
}

/// Per-request page context: the session plus the language it is shown in.
pub struct Page {
    pub session: Session,
    pub lang: LanguageCode,
    /// Back-navigation target echoed from `?goback=`
    pub goback: Option<String>,
}

impl Page {
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::for_lang(&self.lang)
    }

    /// Answer with `body`, adding the language, the user and any pending
    /// flash messages, and persist the session.
    pub async fn respond(mut self, state: &AppState, mut body: Value) -> Response {
        if let Value::Object(map) = &mut body {
            map.insert("lang".into(), json!(self.lang.as_str()));
            map.insert("user".into(), json!(self.session.state.username));
            map.insert("flashes".into(), json!(self.session.state.take_flashes()));
        }
        self.session.respond(&state.sessions, Json(body)).await
    }
}

impl FromRequestParts<AppState> for Page {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut session = Session::from_request_parts(parts, state).await?;
        let params = Query::<PageParams>::try_from_uri(&parts.uri)
            .map(|Query(p)| p)
            .unwrap_or_default();
        let accept_language = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        let lang = state
            .locales
            .select(params.lang.as_deref(), &mut session.state, accept_language);
        Ok(Page {
            session,
            lang,
            goback: params.goback.filter(|g| is_local_path(g)),
        })
    }
}

/// Only same-site paths are followed after a save
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use povoconta_sparql::Qid;

    use crate::config::{Config, Museum};
    use crate::state::AppState;

    /// Nothing listens on the discard port, so any upstream call fails fast.
    pub const UNREACHABLE: &str = "http://127.0.0.1:9";

    pub fn config_with(upstream: &str) -> Config {
        let mut config = Config::from_lookup(|_| None);
        config.wikidata_api_url = format!("{upstream}/w/api.php");
        config.wikidata_sparql_url = format!("{upstream}/sparql");
        config.commons_api_url = format!("{upstream}/commons/api.php");
        config.oauth_mwuri = format!("{upstream}/w/index.php");
        config.http_timeout = Duration::from_secs(2);
        config.http_max_attempts = 1;
        config.museums = vec![Museum {
            slug: "museupaulista".into(),
            root: Qid::parse("Q56677470").unwrap(),
            tutorial: Qid::parse("Q56677463").ok(),
            tutorial_excluded: Qid::parse("Q56730380").ok(),
        }];
        config
    }

    pub fn test_state() -> AppState {
        AppState::new(&config_with(UNREACHABLE))
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap()
    }

    pub async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// `name=value` part of a Set-Cookie header
    pub fn session_cookie(response: &Response) -> String {
        response.headers()["set-cookie"]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }
}
