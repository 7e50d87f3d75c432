//! Server-side sessions and the login state machine
//!
//! A session is anonymous until `/login` stores a request token (pending),
//! and authenticated once the callback has traded it for an access token and
//! a username. Sessions live in memory only, keyed by a random id cookie.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use mediawiki_oauth::{AccessToken, RequestToken};
use moka::future::Cache;
use moka::ops::compute::Op;
use povoconta_sparql::LanguageCode;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use ts_rs::TS;

use crate::constants::{MAX_SESSIONS, SESSION_COOKIE, SESSION_ID_LENGTH};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AuthState {
    Anonymous,
    /// Sent to `Special:OAuth/authorize`, callback not seen yet
    Pending,
    Authenticated,
}

/// Everything remembered about one browser
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub request_token: Option<RequestToken>,
    pub access_token: Option<AccessToken>,
    pub username: Option<String>,
    pub lang: Option<LanguageCode>,
    pub flashes: Vec<String>,
}

impl SessionState {
    pub fn auth_state(&self) -> AuthState {
        match (&self.access_token, &self.username, &self.request_token) {
            (Some(_), Some(_), _) => AuthState::Authenticated,
            (_, _, Some(_)) => AuthState::Pending,
            _ => AuthState::Anonymous,
        }
    }

    /// anonymous/authenticated -> pending
    pub fn begin_login(&mut self, request_token: RequestToken) {
        self.request_token = Some(request_token);
        self.access_token = None;
        self.username = None;
    }

    /// pending -> authenticated
    pub fn complete_login(&mut self, access_token: AccessToken, username: String) {
        self.request_token = None;
        self.access_token = Some(access_token);
        self.username = Some(username);
    }

    /// pending -> anonymous, telling the user why
    pub fn fail_login(&mut self, message: &str) {
        self.clear_tokens();
        self.flash(message);
    }

    /// any -> anonymous. The language preference survives.
    pub fn logout(&mut self) {
        self.clear_tokens();
    }

    fn clear_tokens(&mut self) {
        self.request_token = None;
        self.access_token = None;
        self.username = None;
    }

    pub fn flash(&mut self, message: impl Into<String>) {
        self.flashes.push(message.into());
    }

    pub fn take_flashes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.flashes)
    }

    /// Nothing worth storing
    pub fn is_blank(&self) -> bool {
        self.request_token.is_none()
            && self.access_token.is_none()
            && self.username.is_none()
            && self.lang.is_none()
            && self.flashes.is_empty()
    }
}

/// In-memory session store with an idle timeout
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, SessionState>,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(ttl)
            .build();
        Self {
            cache,
            ttl,
            secure_cookies: false,
        }
    }

    /// Mark session cookies `Secure` (the site is served over https)
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn load(&self, id: &str) -> Option<SessionState> {
        self.cache.get(id).await
    }

    #[cfg(test)]
    pub async fn save(&self, id: &str, state: SessionState) {
        self.cache.insert(id.to_string(), state).await;
    }

    /// Store `state`, or drop the session when it is blank.
    ///
    /// Flashes another request queued after this one loaded the session
    /// (those past `loaded_flashes`) are kept. Returns whether a session
    /// remains stored.
    pub async fn commit(&self, id: &str, mut state: SessionState, loaded_flashes: usize) -> bool {
        let mut stored = false;
        self.cache
            .entry(id.to_string())
            .and_compute_with(|current| {
                if let Some(current) = current {
                    let queued = current.into_value().flashes.into_iter().skip(loaded_flashes);
                    state.flashes.extend(queued);
                }
                let op = if state.is_blank() {
                    Op::Remove
                } else {
                    stored = true;
                    Op::Put(state)
                };
                std::future::ready(op)
            })
            .await;
        stored
    }

    pub fn new_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// The current request's session, created on first use.
///
/// Handlers mutate `state` and finish with [`Session::respond`], which stores
/// it and sets the cookie.
#[derive(Debug)]
pub struct Session {
    id: String,
    pub state: SessionState,
    /// Flashes already queued when the session was loaded
    loaded_flashes: usize,
}

impl Session {
    fn new(id: String, state: SessionState) -> Self {
        let loaded_flashes = state.flashes.len();
        Self {
            id,
            state,
            loaded_flashes,
        }
    }

    pub fn cookie(&self, ttl: Duration, secure: bool) -> String {
        format!(
            "{}={}; HttpOnly;{} Path=/; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            self.id,
            if secure { " Secure;" } else { "" },
            ttl.as_secs()
        )
    }

    /// Persist the session and attach its cookie to `body`.
    pub async fn respond(self, store: &SessionStore, body: impl IntoResponse) -> Response {
        let cookie = self.cookie(store.ttl(), store.secure_cookies);
        if store.commit(&self.id, self.state, self.loaded_flashes).await {
            ([(SET_COOKIE, cookie)], body).into_response()
        } else {
            body.into_response()
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = CookieJar::from_headers(&parts.headers);
        if let Some(id) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
            if let Some(stored) = state.sessions.load(&id).await {
                return Ok(Session::new(id, stored));
            }
        }
        Ok(Session::new(SessionStore::new_id(), SessionState::default()))
    }
}

/// A session that has completed the OAuth handshake
#[derive(Debug)]
pub struct AuthSession {
    pub session: Session,
    pub access_token: AccessToken,
    pub username: String,
}

/// Use as a handler parameter to require a logged-in user; rejects with 401.
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        match (&session.state.access_token, &session.state.username) {
            (Some(token), Some(username)) => Ok(AuthSession {
                access_token: token.clone(),
                username: username.clone(),
                session,
            }),
            _ => Err(AppError::Unauthorized),
        }
    }
}
