use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use crate::constants::{MIN_SEARCH_TERM_LENGTH, SEARCH_LIMIT};
use crate::error::AppError;
use crate::routes::Page;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    term: String,
}

/// GET /search?term=...
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    page: Page,
) -> Result<Response, AppError> {
    let term = params.term.trim();
    let results = if term.chars().count() < MIN_SEARCH_TERM_LENGTH {
        Vec::new()
    } else {
        state
            .wikidata
            .search(term, page.lang.as_str(), SEARCH_LIMIT)
            .await?
            .or_default()
    };
    Ok(page
        .respond(&state, json!({ "term": term, "results": results }))
        .await)
}
