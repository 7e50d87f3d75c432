use axum::extract::{Path, State};
use axum::response::{Redirect, Response};
use axum::Form;
use futures::TryFutureExt;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use ts_rs::TS;

use povoconta_sparql::queries;
use povoconta_sparql::views::{first_qid, DepictRow, WorkDetail};
use povoconta_sparql::{map_rows, Qid};
use wikidata_client::{DepictedSubject, Fetched};

use crate::config::Museum;
use crate::constants::GOBACK_FIELD;
use crate::error::AppError;
use crate::routes::browse::rows;
use crate::routes::{is_local_path, Page};
use crate::session::AuthSession;
use crate::state::AppState;
use crate::writeback::{remove_quantities, save_quantities, SaveReport};

/// A depicted subject on the work page, with the form field that edits it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DepictEntry {
    pub statement_id: String,
    pub qid: String,
    pub label: String,
    #[ts(optional)]
    pub description: Option<String>,
    #[ts(type = "number | null")]
    pub quantity: Option<u64>,
    #[ts(optional)]
    pub qualifier_hash: Option<String>,
    /// `statementID;qualifierHash`, or `None` when the quantity cannot be
    /// edited safely
    #[ts(type = "string | null")]
    pub field: Option<String>,
}

impl DepictEntry {
    fn new(
        statement_id: String,
        qid: String,
        label: String,
        description: Option<String>,
        quantity: Option<u64>,
        qualifier_hash: Option<String>,
    ) -> Self {
        let field = Some(format!(
            "{};{}",
            statement_id,
            qualifier_hash.as_deref().unwrap_or_default()
        ));
        Self {
            statement_id,
            qid,
            label,
            description,
            quantity,
            qualifier_hash,
            field,
        }
    }

    /// Shown without a form field: a quantity whose qualifier hash is unknown
    /// would be written as a second qualifier instead of updating the first.
    fn read_only(mut self) -> Self {
        self.field = None;
        self
    }
}

/// Join the action API's view of the P180 statements (hashes, live
/// quantities) with the query service's (descriptions). When the entity
/// could not be read, the query service rows are used without hashes and
/// subjects that already carry a quantity become read-only.
pub fn merge_depicts(subjects: Fetched<Vec<DepictedSubject>>, rows: Vec<DepictRow>) -> Vec<DepictEntry> {
    match subjects {
        Fetched::Found(subjects) => subjects
            .into_iter()
            .map(|s| {
                let description = rows
                    .iter()
                    .find(|r| r.statement_id == s.statement_id)
                    .and_then(|r| r.description.clone());
                DepictEntry::new(
                    s.statement_id,
                    s.qid,
                    s.label,
                    description,
                    s.quantity,
                    s.qualifier_hash,
                )
            })
            .collect(),
        Fetched::Empty | Fetched::Malformed(_) => rows
            .into_iter()
            .map(|r| {
                let quantified = r.quantity.is_some();
                let entry =
                    DepictEntry::new(r.statement_id, r.qid, r.label, r.description, r.quantity, None);
                if quantified {
                    entry.read_only()
                } else {
                    entry
                }
            })
            .collect(),
    }
}

/// GET /{museum}/qid/{qid}
pub async fn detail(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    state.museum(&slug)?;
    let (work, depicts) = match Qid::parse(&raw) {
        Ok(qid) => {
            let lang = page.lang.as_str();
            let data_query = queries::work_data(&qid, &page.lang);
            let descriptions_query = queries::work_depicts(&qid, &page.lang);
            let data = rows(&state, &data_query);
            let descriptions = rows(&state, &descriptions_query);
            let image = state.wikidata.get_p18(qid.as_str()).map_err(AppError::from);
            let subjects = state.wikidata.get_p180(qid.as_str(), lang).map_err(AppError::from);
            let (data, descriptions, image, subjects) =
                futures::try_join!(data, descriptions, image, subjects)?;

            let vocab = page.vocabulary();
            let mut work = data
                .first()
                .and_then(|row| WorkDetail::from_binding(row, &vocab))
                .unwrap_or_else(|| WorkDetail::empty(qid.as_str()));
            if let Some(url) = image.found() {
                work.image = Some(url);
            }
            (work, merge_depicts(subjects, map_rows(&descriptions)))
        }
        Err(_) => (WorkDetail::empty(&raw), Vec::new()),
    };

    let auth = page.session.state.auth_state();
    let goback = page.goback.clone();
    let body = json!({
        "museum": slug,
        "auth": auth,
        "work": work,
        "depicts": depicts,
        "goback": goback,
    });
    Ok(page.respond(&state, body).await)
}

/// Path of a random in-scope work other than `current`, or the museum's
/// collection list when none can be picked.
async fn next_target(state: &AppState, museum: &Museum, current: &Qid, goback: Option<&str>) -> String {
    let seed: f64 = rand::random();
    let picked = match rows(state, &queries::next_qid(&museum.root, current, seed)).await {
        Ok(rows) => first_qid(&rows),
        Err(e) => {
            warn!(error = ?e, "Could not pick the next work");
            None
        }
    };
    match picked {
        Some(next) => {
            let mut target = format!("/{}/qid/{}", museum.slug, next);
            if let Some(goback) = goback {
                target.push_str("?goback=");
                target.push_str(&urlencoding::encode(goback));
            }
            target
        }
        None => format!("/{}/p195", museum.slug),
    }
}

/// GET /{museum}/next/{qid}
pub async fn next(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    page: Page,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let current = Qid::parse(&raw).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let target = next_target(&state, museum, &current, page.goback.as_deref()).await;
    Ok(page.session.respond(&state.sessions, Redirect::to(&target)).await)
}

fn goback_field(fields: &[(String, String)]) -> Option<&str> {
    fields
        .iter()
        .find(|(name, _)| name == GOBACK_FIELD)
        .map(|(_, value)| value.as_str())
        .filter(|value| is_local_path(value))
}

fn flash_report(auth: &mut AuthSession, report: &SaveReport) {
    for message in report.flash_messages() {
        auth.session.state.flash(message);
    }
}

/// POST /{museum}/save/{qid}
/// Writes the submitted quantities, then moves on to another work.
pub async fn save(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    mut auth: AuthSession,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let current = Qid::parse(&raw).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let editor = state.wikidata.editor(state.oauth.signer(&auth.access_token));
    let report = save_quantities(&editor, &fields).await;
    info!(
        user = %auth.username,
        work = %current,
        saved = report.saved.len(),
        clean = report.is_clean(),
        "Save submitted"
    );
    flash_report(&mut auth, &report);

    let target = next_target(&state, museum, &current, goback_field(&fields)).await;
    Ok(auth.session.respond(&state.sessions, Redirect::to(&target)).await)
}

/// POST /{museum}/remove/{qid}
/// Removes the named quantity qualifiers and returns to the work.
pub async fn remove(
    State(state): State<AppState>,
    Path((slug, raw)): Path<(String, String)>,
    mut auth: AuthSession,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let museum = state.museum(&slug)?;
    let current = Qid::parse(&raw).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let editor = state.wikidata.editor(state.oauth.signer(&auth.access_token));
    let report = remove_quantities(&editor, &fields).await;
    info!(
        user = %auth.username,
        work = %current,
        removed = report.saved.len(),
        "Removal submitted"
    );
    flash_report(&mut auth, &report);

    let mut target = format!("/{}/qid/{}", museum.slug, current);
    if let Some(goback) = goback_field(&fields) {
        target.push_str("?goback=");
        target.push_str(&urlencoding::encode(goback));
    }
    Ok(auth.session.respond(&state.sessions, Redirect::to(&target)).await)
}
