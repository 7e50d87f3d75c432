//! Turning a submitted quantity form into qualifier edits
//!
//! Fields are named `statementID;qualifierHash`. Every field is handled on
//! its own: a bad value or a failed edit is recorded in the [`SaveReport`]
//! and the rest of the batch still goes through.

use async_trait::async_trait;
use tracing::{info, warn};
use wikidata_client::{Editor, QualifierChange};

use crate::constants::EDIT_SUMMARY;
use crate::validation::{parse_field_key, validate_quantity};

/// Something that can write P1114 qualifiers for the logged-in user
#[async_trait]
pub trait QualifierWriter: Send + Sync {
    async fn set_qualifier(&self, change: &QualifierChange) -> Result<(), String>;
    async fn remove_qualifier(&self, statement_id: &str, snak_hash: &str) -> Result<(), String>;
}

#[async_trait]
impl QualifierWriter for Editor<'_> {
    async fn set_qualifier(&self, change: &QualifierChange) -> Result<(), String> {
        Editor::set_qualifier(self, change)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn remove_qualifier(&self, statement_id: &str, snak_hash: &str) -> Result<(), String> {
        Editor::remove_qualifier(self, statement_id, snak_hash)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Outcome of one submitted form
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Statement ids written successfully
    pub saved: Vec<String>,
    /// `(field, reason)` for values that never reached Wikidata
    pub rejected: Vec<(String, String)>,
    /// `(statement id, error)` for edits Wikidata refused
    pub failed: Vec<(String, String)>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }

    /// One line per problem, ready to be flashed
    pub fn flash_messages(&self) -> Vec<String> {
        let rejected = self
            .rejected
            .iter()
            .map(|(field, reason)| format!("Not saved ({}): {}", field, reason));
        let failed = self
            .failed
            .iter()
            .map(|(statement, error)| format!("Wikidata refused the edit to {}: {}", statement, error));
        rejected.chain(failed).collect()
    }
}

/// Validate the form into qualifier changes. Blank fields are skipped, since
/// the form carries one input per depicted subject whether or not it was filled.
pub fn plan_edits(fields: &[(String, String)], report: &mut SaveReport) -> Vec<QualifierChange> {
    let mut changes = Vec::new();
    for (name, value) in fields {
        let Some(key) = parse_field_key(name) else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }
        match validate_quantity(value) {
            Ok(amount) => changes.push(
                QualifierChange::quantity(&key.statement_id, amount, key.hash.as_deref())
                    .with_summary(EDIT_SUMMARY),
            ),
            Err(e) => {
                warn!(field = %name, value = %value, error = %e, "Rejected quantity");
                report.rejected.push((key.statement_id, e.to_string()));
            }
        }
    }
    changes
}

/// Write every valid quantity in the form
pub async fn save_quantities(
    writer: &dyn QualifierWriter,
    fields: &[(String, String)],
) -> SaveReport {
    let mut report = SaveReport::default();
    for change in plan_edits(fields, &mut report) {
        match writer.set_qualifier(&change).await {
            Ok(()) => report.saved.push(change.statement_id),
            Err(e) => {
                warn!(statement = %change.statement_id, error = %e, "Qualifier edit failed");
                report.failed.push((change.statement_id, e));
            }
        }
    }
    info!(
        saved = report.saved.len(),
        rejected = report.rejected.len(),
        failed = report.failed.len(),
        "Quantities submitted"
    );
    report
}

/// `(statement id, snak hash)` pairs named by a removal form. Fields without
/// a hash have no qualifier to remove.
pub fn plan_removals(fields: &[(String, String)], report: &mut SaveReport) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(name, _)| parse_field_key(name))
        .filter_map(|key| match key.hash {
            Some(hash) => Some((key.statement_id, hash)),
            None => {
                report
                    .rejected
                    .push((key.statement_id, "no quantity to remove".to_string()));
                None
            }
        })
        .collect()
}

/// Remove the qualifiers named in the form
pub async fn remove_quantities(
    writer: &dyn QualifierWriter,
    fields: &[(String, String)],
) -> SaveReport {
    let mut report = SaveReport::default();
    for (statement, hash) in plan_removals(fields, &mut report) {
        match writer.remove_qualifier(&statement, &hash).await {
            Ok(()) => report.saved.push(statement),
            Err(e) => {
                warn!(statement = %statement, error = %e, "Qualifier removal failed");
                report.failed.push((statement, e));
            }
        }
    }
    report
}
