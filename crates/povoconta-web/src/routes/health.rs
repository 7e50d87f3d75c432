use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use ts_rs::TS;

use crate::state::AppState;

#[derive(Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HealthResponse {
    pub status: String,
    #[ts(type = "number")]
    pub uptime_secs: u64,
    #[ts(type = "number")]
    pub museums: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        museums: state.museums.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::create_router;
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state());
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_none());
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
        assert_eq!(json["museums"], 1);
    }
}
