use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;

use povoconta_sparql::queries;
use povoconta_sparql::views::{TutorialCollection, TutorialImage};
use povoconta_sparql::map_rows;

use crate::error::AppError;
use crate::routes::browse::rows;
use crate::routes::Page;
use crate::state::AppState;

/// GET /{museum}/tutorial
/// Sub-collection chart data and example images. Museums without a tutorial
/// collection get no images.
pub async fn tutorial(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;

    let collections_query = queries::tutorial_collections(&museum.root, &page.lang);
    let collections = rows(&state, &collections_query);
    let images = async {
        match &museum.tutorial {
            Some(collection) => {
                let query =
                    queries::tutorial_images(collection, museum.tutorial_excluded.as_ref());
                rows(&state, &query).await
            }
            None => Ok(Vec::new()),
        }
    };
    let (collections, images) = futures::try_join!(collections, images)?;

    let collections: Vec<TutorialCollection> = map_rows(&collections);
    let images: Vec<TutorialImage> = map_rows(&images);
    Ok(page
        .respond(
            &state,
            json!({ "museum": slug, "collections": collections, "images": images }),
        )
        .await)
}

#[cfg(test)]
mod tests {
    use super::super::create_router;
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_tutorial_unknown_museum() {
        let app = create_router(test_state());
        let response = app.oneshot(get("/nowhere/tutorial")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Unknown museum: nowhere");
    }
}
