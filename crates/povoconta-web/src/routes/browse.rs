//! Museum listings: per collection, creator, decade, instance type and
//! depicted subject, each with a page for one value.
//!
//! A malformed QID or decade in the path answers with an empty view-model
//! without asking upstream.

use axum::extract::{Path, State};
use axum::response::Response;
use futures::future::try_join_all;
use serde_json::json;
use tracing::debug;

use povoconta_sparql::queries::{self, TutorialScope};
use povoconta_sparql::views::{
    decade_counts, single_total, CollectionInfo, CollectionPage, CreatorInfo, CreatorPage,
    DecadeCount, FacetCount, WorkListing, WorkSummary,
};
use povoconta_sparql::{map_rows, Decade, Qid};
use wikidata_client::Binding;

use crate::error::AppError;
use crate::routes::Page;
use crate::state::AppState;

/// Run a query, treating an empty or unreadable answer as no rows
pub(crate) async fn rows(state: &AppState, query: &str) -> Result<Vec<Binding>, AppError> {
    Ok(state.wikidata.sparql(query).await?.or_default())
}

/// GET /{museum}
/// The museum's name and how many of its works are ready to annotate.
pub async fn museum(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let name = state.wikidata.get_name(museum.root.as_str(), page.lang.as_str());
    let wikidata = &state.wikidata;
    let totals = try_join_all(TutorialScope::ALL.iter().map(|scope| {
        let query = queries::tutorial_total(&museum.root, *scope);
        async move { wikidata.sparql(&query).await }
    }));
    let (name, totals) = futures::try_join!(name, totals)?;
    let totals: Vec<u64> = totals
        .into_iter()
        .map(|rows| single_total(&rows.or_default()))
        .collect();

    let body = json!({
        "museum": { "slug": museum.slug, "qid": museum.root.as_str(), "name": name },
        "totals": {
            "all": totals[0],
            "withImage": totals[1],
            "withDepicts": totals[2],
            "inScope": totals[3],
        },
    });
    Ok(page.respond(&state, body).await)
}

/// GET /{museum}/p195
pub async fn collections(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let rows = rows(&state, &queries::per_collection(&museum.root, &page.lang)).await?;
    let collections: Vec<FacetCount> = map_rows(&rows);
    Ok(page
        .respond(&state, json!({ "museum": slug, "collections": collections }))
        .await)
}

/// GET /{museum}/p195/{qid}
pub async fn collection(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let view = match Qid::parse(&raw) {
        Ok(qid) => {
            let header_query = queries::collection_data(&qid, &page.lang);
            let works_query = queries::works_in_collection(&museum.root, &qid, &page.lang);
            let header = rows(&state, &header_query);
            let works = rows(&state, &works_query);
            let (header, works) = futures::try_join!(header, works)?;
            CollectionPage::from_rows(&qid, &header, &works)
        }
        Err(e) => {
            debug!(error = %e, "Empty collection page");
            CollectionPage {
                collection: CollectionInfo::empty(&raw),
                works: Vec::new(),
            }
        }
    };
    Ok(page
        .respond(&state, json!({ "museum": slug, "page": view }))
        .await)
}

/// GET /{museum}/p170
pub async fn creators(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let rows = rows(&state, &queries::per_creator(&museum.root, &page.lang)).await?;
    let creators: Vec<FacetCount> = map_rows(&rows);
    Ok(page
        .respond(&state, json!({ "museum": slug, "creators": creators }))
        .await)
}

/// GET /{museum}/p170/{qid}
pub async fn creator(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let view = match Qid::parse(&raw) {
        Ok(qid) => {
            let header_query = queries::creator_data(&museum.root, &qid, &page.lang);
            let works_query = queries::works_of_creator(&museum.root, &qid, &page.lang);
            let header = rows(&state, &header_query);
            let works = rows(&state, &works_query);
            let (header, works) = futures::try_join!(header, works)?;
            CreatorPage::from_rows(&qid, &header, &works)
        }
        Err(e) => {
            debug!(error = %e, "Empty creator page");
            CreatorPage {
                creator: CreatorInfo::empty(&raw),
                works: Vec::new(),
            }
        }
    };
    Ok(page
        .respond(&state, json!({ "museum": slug, "page": view }))
        .await)
}

/// GET /{museum}/p571
pub async fn decades(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let vocab = page.vocabulary();
    let rows = rows(
        &state,
        &queries::per_decade(&museum.root, vocab.undetermined_decade),
    )
    .await?;
    let decades = decade_counts(&rows, &vocab);
    Ok(page
        .respond(&state, json!({ "museum": slug, "decades": decades }))
        .await)
}

/// GET /{museum}/p571/{decade}
pub async fn decade(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let vocab = page.vocabulary();
    let listing = match Decade::parse(&raw) {
        Ok(decade) => {
            let rows = rows(
                &state,
                &queries::works_of_decade(
                    &museum.root,
                    decade,
                    &page.lang,
                    vocab.undetermined_decade,
                ),
            )
            .await?;
            WorkListing {
                key: decade.key(),
                label: DecadeCount::label_for(decade, &vocab),
                works: map_rows(&rows),
            }
        }
        Err(e) => {
            debug!(error = %e, "Empty decade page");
            empty_listing(&raw)
        }
    };
    Ok(page
        .respond(&state, json!({ "museum": slug, "listing": listing }))
        .await)
}

/// GET /{museum}/p31
pub async fn instances(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let rows = rows(&state, &queries::per_instance(&museum.root, &page.lang)).await?;
    let instances: Vec<FacetCount> = map_rows(&rows);
    Ok(page
        .respond(&state, json!({ "museum": slug, "instances": instances }))
        .await)
}

/// GET /{museum}/p31/{qid}
pub async fn instance(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let listing = match Qid::parse(&raw) {
        Ok(qid) => {
            let query = queries::works_of_instance(&museum.root, &qid, &page.lang);
            labelled_listing(&state, &page, &qid, &query).await?
        }
        Err(_) => empty_listing(&raw),
    };
    Ok(page
        .respond(&state, json!({ "museum": slug, "listing": listing }))
        .await)
}

/// GET /{museum}/p180
pub async fn depicts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let rows = rows(&state, &queries::per_depict(&museum.root, &page.lang)).await?;
    let depicts: Vec<FacetCount> = map_rows(&rows);
    Ok(page
        .respond(&state, json!({ "museum": slug, "depicts": depicts }))
        .await)
}

/// GET /{museum}/p180/{qid}
pub async fn depict(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let listing = match Qid::parse(&raw) {
        Ok(qid) => {
            let query = queries::works_of_depict(&museum.root, &qid, &page.lang);
            labelled_listing(&state, &page, &qid, &query).await?
        }
        Err(_) => empty_listing(&raw),
    };
    Ok(page
        .respond(&state, json!({ "museum": slug, "listing": listing }))
        .await)
}

/// Works of a query, headed by the label of the entity they share
async fn labelled_listing(
    state: &AppState,
    page: &Page,
    qid: &Qid,
    query: &str,
) -> Result<WorkListing, AppError> {
    let label = state.wikidata.get_name(qid.as_str(), page.lang.as_str());
    let works = state.wikidata.sparql(query);
    let (label, works) = futures::try_join!(label, works)?;
    let works: Vec<WorkSummary> = map_rows(&works.or_default());
    Ok(WorkListing {
        key: qid.to_string(),
        label,
        works,
    })
}

fn empty_listing(key: &str) -> WorkListing {
    WorkListing {
        key: key.to_string(),
        label: key.to_string(),
        works: Vec::new(),
    }
}
