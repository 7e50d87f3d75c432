use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use ts_rs::TS;

use crate::routes::Page;
use crate::state::AppState;

/// A configured museum as listed on the home page
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MuseumEntry {
    pub slug: String,
    pub qid: String,
    /// Label of the root collection, or its QID when Wikidata is unreachable
    pub name: String,
}

/// GET /
pub async fn home(State(state): State<AppState>, page: Page) -> Response {
    let roots: Vec<&str> = state.museums.iter().map(|m| m.root.as_str()).collect();
    let names = state
        .wikidata
        .labels(&roots, page.lang.as_str())
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Could not label museums");
            Default::default()
        });

    let museums: Vec<MuseumEntry> = state
        .museums
        .iter()
        .map(|m| MuseumEntry {
            slug: m.slug.clone(),
            qid: m.root.to_string(),
            name: names
                .get(m.root.as_str())
                .cloned()
                .unwrap_or_else(|| m.root.to_string()),
        })
        .collect();

    let auth = page.session.state.auth_state();
    page.respond(&state, json!({ "auth": auth, "museums": museums }))
        .await
}
