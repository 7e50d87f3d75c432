//! `wbgetentities` / `wbsearchentities` response types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::edit::PROP_QUANTITY;
use crate::fetched::Fetched;

/// Image (Commons filename)
pub const PROP_IMAGE: &str = "P18";

/// Depicts (entity reference)
pub const PROP_DEPICTS: &str = "P180";

/// Languages tried after the requested one, before giving up and showing the QID.
pub const LABEL_FALLBACKS: [&str; 3] = ["pt-br", "pt", "en"];

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, Entity>,
}

/// A Wikidata item as returned by `wbgetentities`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    /// Present (as an empty string) when the requested id does not exist
    #[serde(default)]
    pub missing: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, LangValue>,
    #[serde(default)]
    pub descriptions: HashMap<String, LangValue>,
    #[serde(default)]
    pub claims: HashMap<String, Vec<Claim>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LangValue {
    pub language: String,
    pub value: String,
}

/// A statement: main snak plus qualifiers
#[derive(Debug, Clone, Deserialize)]
pub struct Claim {
    pub id: String,
    pub mainsnak: Snak,
    #[serde(default)]
    pub qualifiers: HashMap<String, Vec<Snak>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snak {
    #[serde(default)]
    pub snaktype: String,
    #[serde(default)]
    pub property: String,
    /// Qualifier snaks carry a hash used to target updates
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub datavalue: Option<DataValue>,
}

/// `{"type": ..., "value": ...}`. The payload shape depends on `type`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl DataValue {
    /// Plain string payload (commonsMedia, external ids)
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// `wikibase-entityid` payload
    pub fn entity_id(&self) -> Option<&str> {
        self.value.get("id").and_then(Value::as_str)
    }

    /// `quantity` payload, signed decimal string such as `"+5"`
    pub fn quantity_amount(&self) -> Option<u64> {
        let amount = self.value.get("amount")?.as_str()?;
        parse_amount(amount)
    }
}

fn parse_amount(amount: &str) -> Option<u64> {
    let trimmed = amount.trim_start_matches('+');
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(n);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc() as u64)
}

/// A P180 statement with its quantity qualifier, before labels are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepictedClaim {
    pub statement_id: String,
    pub qid: String,
    pub quantity: Option<u64>,
    pub qualifier_hash: Option<String>,
}

/// A depicted subject ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepictedSubject {
    pub statement_id: String,
    pub qid: String,
    pub label: String,
    pub quantity: Option<u64>,
    pub qualifier_hash: Option<String>,
}

impl DepictedSubject {
    pub fn from_claim(claim: DepictedClaim, label: String) -> Self {
        Self {
            statement_id: claim.statement_id,
            qid: claim.qid,
            label,
            quantity: claim.quantity,
            qualifier_hash: claim.qualifier_hash,
        }
    }
}

impl Entity {
    pub fn is_missing(&self) -> bool {
        self.missing.is_some()
    }

    /// Label in `lang`, falling back through [`LABEL_FALLBACKS`], then the id itself.
    pub fn label(&self, lang: &str) -> String {
        pick_label(&self.labels, &self.id, lang)
    }

    /// Commons filename from the first P18 claim
    pub fn p18_filename(&self) -> Option<&str> {
        self.claims
            .get(PROP_IMAGE)?
            .iter()
            .find_map(|claim| claim.mainsnak.datavalue.as_ref()?.as_str())
    }

    /// P180 claims whose value is an item (somevalue/novalue skipped)
    pub fn depicted_claims(&self) -> Vec<DepictedClaim> {
        let Some(claims) = self.claims.get(PROP_DEPICTS) else {
            return Vec::new();
        };
        claims
            .iter()
            .filter_map(|claim| {
                let qid = claim.mainsnak.datavalue.as_ref()?.entity_id()?.to_string();
                let quantity_snak = claim
                    .qualifiers
                    .get(PROP_QUANTITY)
                    .and_then(|snaks| snaks.first());
                Some(DepictedClaim {
                    statement_id: claim.id.clone(),
                    qid,
                    quantity: quantity_snak
                        .and_then(|s| s.datavalue.as_ref())
                        .and_then(DataValue::quantity_amount),
                    qualifier_hash: quantity_snak.and_then(|s| s.hash.clone()),
                })
            })
            .collect()
    }
}

/// Pick a label: requested language, then `pt-br`, `pt`, `en`, then the QID.
pub fn pick_label(labels: &HashMap<String, LangValue>, qid: &str, lang: &str) -> String {
    labels
        .get(lang)
        .or_else(|| LABEL_FALLBACKS.iter().find_map(|code| labels.get(*code)))
        .map(|label| label.value.clone())
        .unwrap_or_else(|| qid.to_string())
}

/// Parse a `wbgetentities` body.
///
/// Missing entities are dropped; an answer with none left is `Empty`.
pub fn parse_entities(body: &str) -> Fetched<HashMap<String, Entity>> {
    let response: EntitiesResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Fetched::Malformed(e.to_string()),
    };
    let entities: HashMap<String, Entity> = response
        .entities
        .into_iter()
        .filter(|(_, entity)| !entity.is_missing())
        .map(|(id, mut entity)| {
            if entity.id.is_empty() {
                entity.id.clone_from(&id);
            }
            (id, entity)
        })
        .collect();
    if entities.is_empty() {
        Fetched::Empty
    } else {
        Fetched::Found(entities)
    }
}

/// One `wbsearchentities` match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub qid: String,
    pub label: String,
    pub description: Option<String>,
}

/// Parse a `wbsearchentities` body.
pub fn parse_search(body: &str) -> Fetched<Vec<SearchHit>> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return Fetched::Malformed(e.to_string()),
    };
    let Some(items) = value.get("search").and_then(Value::as_array) else {
        return Fetched::Malformed("response has no search array".to_string());
    };
    let hits: Vec<SearchHit> = items
        .iter()
        .filter_map(|item| {
            let qid = item.get("id")?.as_str()?.to_string();
            let label = item
                .get("label")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| qid.clone());
            Some(SearchHit {
                qid,
                label,
                description: item
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect();
    if hits.is_empty() {
        Fetched::Empty
    } else {
        Fetched::Found(hits)
    }
}
