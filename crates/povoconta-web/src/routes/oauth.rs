use axum::extract::{RawQuery, State};
use axum::response::{Redirect, Response};
use serde_json::json;
use tracing::{error, info, warn};

use crate::constants::{FLASH_CALLBACK_WITHOUT_LOGIN, FLASH_LOGIN_FAILED, FLASH_LOGIN_UNAVAILABLE};
use crate::routes::Page;
use crate::session::Session;
use crate::state::AppState;

/// GET /login
/// Starts the handshake and sends the browser to `Special:OAuth/authorize`.
pub async fn login(State(state): State<AppState>, mut session: Session) -> Response {
    match state.oauth.initiate().await {
        Ok((authorize_url, request_token)) => {
            info!("OAuth login initiated");
            session.state.begin_login(request_token);
            session
                .respond(&state.sessions, Redirect::to(&authorize_url))
                .await
        }
        Err(e) => {
            error!(error = %e, "OAuth initiate failed");
            session.state.fail_login(FLASH_LOGIN_UNAVAILABLE);
            session.respond(&state.sessions, Redirect::to("/")).await
        }
    }
}

/// GET /oauth-callback?oauth_verifier=...&oauth_token=...
/// Completes the handshake for the pending login and redirects home.
pub async fn callback(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    mut session: Session,
) -> Response {
    let Some(request_token) = session.state.request_token.clone() else {
        warn!("OAuth callback without a pending login");
        session.state.flash(FLASH_CALLBACK_WITHOUT_LOGIN);
        return session.respond(&state.sessions, Redirect::to("/")).await;
    };

    let query = query.unwrap_or_default();
    let outcome = match state.oauth.complete(&request_token, &query).await {
        Ok(access_token) => state
            .oauth
            .identify(&access_token)
            .await
            .map(|identity| (access_token, identity)),
        Err(e) => Err(e),
    };

    match outcome {
        Ok((access_token, identity)) => {
            info!(user = %identity.username, "OAuth login completed");
            session.state.complete_login(access_token, identity.username);
        }
        Err(e) => {
            error!(error = %e, "OAuth callback failed");
            session.state.fail_login(FLASH_LOGIN_FAILED);
        }
    }
    session.respond(&state.sessions, Redirect::to("/")).await
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, mut session: Session) -> Response {
    if let Some(user) = &session.state.username {
        info!(user = %user, "Logout");
    }
    session.state.logout();
    session.respond(&state.sessions, Redirect::to("/")).await
}

/// GET /me
/// Returns `{ auth, user, lang, locales, flashes }`.
pub async fn me(State(state): State<AppState>, page: Page) -> Response {
    let auth = page.session.state.auth_state();
    let locales: Vec<&str> = state.locales.supported().iter().map(|l| l.as_str()).collect();
    let body = json!({ "auth": auth, "locales": locales });
    page.respond(&state, body).await
}

#[cfg(test)]
mod tests {
    use super::super::create_router;
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use mediawiki_oauth::{AccessToken, RequestToken};
    use tower::ServiceExt;

    use crate::constants::{FLASH_CALLBACK_WITHOUT_LOGIN, FLASH_LOGIN_FAILED, FLASH_LOGIN_UNAVAILABLE};
    use crate::session::SessionState;

    #[tokio::test]
    async fn test_me_anonymous() {
        let app = create_router(test_state());
        let response = app.oneshot(get("/me")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["auth"], "anonymous");
        assert!(json["user"].is_null());
        assert_eq!(json["lang"], "pt-br");
        assert_eq!(json["locales"], serde_json::json!(["pt-br", "pt", "en"]));
        assert_eq!(json["flashes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_callback_without_pending_login() {
        let app = create_router(test_state());
        let response = app
            .clone()
            .oneshot(get("/oauth-callback?oauth_verifier=v&oauth_token=t"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
        let cookie = session_cookie(&response);

        let response = app
            .clone()
            .oneshot(get_with_cookie("/me", &cookie))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["flashes"][0], FLASH_CALLBACK_WITHOUT_LOGIN);

        // Flashes are shown once
        let response = app.oneshot(get_with_cookie("/me", &cookie)).await.unwrap();
        let json = json_body(response).await;
        assert_eq!(json["flashes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_callback_failure_returns_to_anonymous() {
        let state = test_state();
        let mut pending = SessionState::default();
        pending.begin_login(RequestToken::new("rt", "rs"));
        state.sessions.save("pending", pending).await;

        let app = create_router(state.clone());
        let response = app
            .oneshot(get_with_cookie(
                "/oauth-callback?oauth_verifier=v&oauth_token=rt",
                "povoconta_session=pending",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let stored = state.sessions.load("pending").await.unwrap();
        assert!(stored.request_token.is_none());
        assert!(stored.access_token.is_none());
        assert_eq!(stored.flashes, vec![FLASH_LOGIN_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_login_unreachable_provider() {
        let app = create_router(test_state());
        let response = app.clone().oneshot(get("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");

        let cookie = session_cookie(&response);
        let response = app.oneshot(get_with_cookie("/me", &cookie)).await.unwrap();
        let json = json_body(response).await;
        assert_eq!(json["flashes"][0], FLASH_LOGIN_UNAVAILABLE);
        assert_eq!(json["auth"], "anonymous");
    }

    #[tokio::test]
    async fn test_logout_clears_login() {
        let state = test_state();
        let mut session = SessionState::default();
        session.complete_login(AccessToken::new("at", "as"), "Alice".into());
        state.sessions.save("alice", session).await;

        let app = create_router(state.clone());
        let response = app
            .oneshot(get_with_cookie("/logout", "povoconta_session=alice"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
        assert!(state.sessions.load("alice").await.is_none());
    }
}
