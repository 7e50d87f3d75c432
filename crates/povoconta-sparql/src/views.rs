//! Query rows to view-models

use serde::Serialize;
use ts_rs::TS;
use wikidata_client::{entity_id_from_uri, Binding};

use crate::dates::{format_date, Vocabulary};
use crate::ids::{Decade, Qid};

const STATEMENT_PREFIX: &str = "http://www.wikidata.org/entity/statement/";

/// Build a view-model from one result row; `None` drops the row.
pub trait FromBinding: Sized {
    fn from_binding(row: &Binding) -> Option<Self>;
}

/// Map every row, skipping those missing a required variable.
pub fn map_rows<T: FromBinding>(rows: &[Binding]) -> Vec<T> {
    rows.iter().filter_map(T::from_binding).collect()
}

fn text<'a>(row: &'a Binding, var: &str) -> Option<&'a str> {
    row.get(var).map(|v| v.value.as_str()).filter(|v| !v.is_empty())
}

fn qid_of(row: &Binding, var: &str) -> Option<String> {
    text(row, var).map(|uri| entity_id_from_uri(uri).to_string())
}

fn count(row: &Binding, var: &str) -> u64 {
    text(row, var).and_then(parse_count).unwrap_or(0)
}

/// Integer from an `xsd:integer` / `xsd:decimal` literal
fn parse_count(value: &str) -> Option<u64> {
    let value = value.trim_start_matches('+');
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.trunc() as u64)
    })
}

/// Label variable, or the id when the label service had nothing
fn label_or(row: &Binding, var: &str, qid: &str) -> String {
    text(row, var).unwrap_or(qid).to_string()
}

/// Statement node URI (`…/entity/statement/Q1-GUID`) to statement id (`Q1$GUID`)
pub fn statement_id_from_uri(uri: &str) -> Option<String> {
    let node = uri.strip_prefix(STATEMENT_PREFIX).unwrap_or(uri);
    let (entity, guid) = node.split_once('-')?;
    if entity.is_empty() || guid.is_empty() || entity.contains('/') {
        return None;
    }
    Some(format!("{entity}${guid}"))
}

/// `(qid, label)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityRef {
    pub qid: String,
    pub label: String,
}

/// Split a `;`-joined list of `id|label` pairs.
///
/// A `;` inside a label leaves a fragment without an id, which is glued back
/// onto the label before it. A list that does not open with a pair is
/// treated as no data rather than paired partially.
pub fn unflatten(joined: Option<&str>) -> Vec<EntityRef> {
    let mut refs: Vec<EntityRef> = Vec::new();
    for fragment in joined.unwrap_or_default().split(';') {
        let pair = fragment
            .split_once('|')
            .and_then(|(id, label)| Some((Qid::parse(id).ok()?, label.trim())));
        match pair {
            Some((qid, label)) => refs.push(EntityRef {
                qid: qid.as_str().to_string(),
                label: label.to_string(),
            }),
            None => match refs.last_mut() {
                Some(last) => {
                    last.label.push(';');
                    last.label.push_str(fragment);
                }
                None if fragment.trim().is_empty() => {}
                None => return Vec::new(),
            },
        }
    }
    refs
}

/// One entry of a per-collection / creator / type / subject listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FacetCount {
    pub qid: String,
    pub label: String,
    #[ts(type = "number")]
    pub total: u64,
}

impl FromBinding for FacetCount {
    fn from_binding(row: &Binding) -> Option<Self> {
        let qid = qid_of(row, "item")?;
        Some(Self {
            label: label_or(row, "item_label", &qid),
            total: count(row, "total"),
            qid,
        })
    }
}

/// A work in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorkSummary {
    pub qid: String,
    pub label: String,
    #[ts(optional)]
    pub image: Option<String>,
    /// Depicted subjects, or already-quantified ones in collection listings
    #[ts(type = "number")]
    pub total: u64,
}

impl FromBinding for WorkSummary {
    fn from_binding(row: &Binding) -> Option<Self> {
        let qid = qid_of(row, "work")?;
        Some(Self {
            label: label_or(row, "work_label", &qid),
            image: text(row, "image").map(str::to_string),
            total: count(row, "total"),
            qid,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NamedAfter {
    pub qid: String,
    pub label: String,
    #[ts(optional)]
    pub article: Option<String>,
}

/// Collection page header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CollectionInfo {
    pub qid: String,
    pub label: String,
    /// Commons category
    #[ts(optional)]
    pub category: Option<String>,
    /// Portuguese Wikipedia article
    #[ts(optional)]
    pub article: Option<String>,
    #[ts(optional)]
    pub named_after: Option<NamedAfter>,
    #[ts(type = "number")]
    pub total: u64,
    #[ts(type = "number")]
    pub total_scope: u64,
}

impl CollectionInfo {
    /// Header for a collection the query service knows nothing about
    pub fn empty(qid: &str) -> Self {
        Self {
            qid: qid.to_string(),
            label: qid.to_string(),
            category: None,
            article: None,
            named_after: None,
            total: 0,
            total_scope: 0,
        }
    }
}

impl FromBinding for CollectionInfo {
    fn from_binding(row: &Binding) -> Option<Self> {
        let qid = qid_of(row, "collection")?;
        let named_after = qid_of(row, "named_after").map(|named| NamedAfter {
            label: label_or(row, "named_after_label", &named),
            article: text(row, "named_after_article").map(str::to_string),
            qid: named,
        });
        Some(Self {
            label: label_or(row, "collection_label", &qid),
            category: text(row, "collection_category").map(str::to_string),
            article: text(row, "collection_article").map(str::to_string),
            named_after,
            total: count(row, "total"),
            total_scope: count(row, "total_scope"),
            qid,
        })
    }
}

/// Creator page header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CreatorInfo {
    pub qid: String,
    pub label: String,
    #[ts(optional)]
    pub article: Option<String>,
    #[ts(type = "number")]
    pub total: u64,
    #[ts(type = "number")]
    pub total_scope: u64,
}

impl CreatorInfo {
    pub fn empty(qid: &str) -> Self {
        Self {
            qid: qid.to_string(),
            label: qid.to_string(),
            article: None,
            total: 0,
            total_scope: 0,
        }
    }
}

impl FromBinding for CreatorInfo {
    fn from_binding(row: &Binding) -> Option<Self> {
        let qid = qid_of(row, "creator")?;
        Some(Self {
            label: label_or(row, "creator_label", &qid),
            article: text(row, "creator_article").map(str::to_string),
            total: count(row, "total"),
            total_scope: count(row, "total_scope"),
            qid,
        })
    }
}

/// Listing page: a header plus its works
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollectionPage {
    pub collection: CollectionInfo,
    pub works: Vec<WorkSummary>,
}

impl CollectionPage {
    /// Page for a collection; zero header rows means zero counts, not an error.
    pub fn from_rows(qid: &Qid, header: &[Binding], works: &[Binding]) -> Self {
        Self {
            collection: header
                .iter()
                .find_map(CollectionInfo::from_binding)
                .unwrap_or_else(|| CollectionInfo::empty(qid.as_str())),
            works: map_rows(works),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreatorPage {
    pub creator: CreatorInfo,
    pub works: Vec<WorkSummary>,
}

impl CreatorPage {
    pub fn from_rows(qid: &Qid, header: &[Binding], works: &[Binding]) -> Self {
        Self {
            creator: header
                .iter()
                .find_map(CreatorInfo::from_binding)
                .unwrap_or_else(|| CreatorInfo::empty(qid.as_str())),
            works: map_rows(works),
        }
    }
}

/// Works grouped under a facet value (decade, type, subject)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorkListing {
    pub key: String,
    pub label: String,
    pub works: Vec<WorkSummary>,
}

/// One decade bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecadeCount {
    /// `1820` or `undetermined`
    pub key: String,
    pub label: String,
    #[ts(type = "number")]
    pub total: u64,
}

impl DecadeCount {
    pub fn label_for(decade: Decade, vocab: &Vocabulary) -> String {
        match decade {
            Decade::Year(year) => format!("{} {}", vocab.decade_prefix, year),
            Decade::Undetermined => vocab.undetermined_decade.to_string(),
        }
    }
}

/// Decade rows, recognising the sentinel the query was built with.
pub fn decade_counts(rows: &[Binding], vocab: &Vocabulary) -> Vec<DecadeCount> {
    rows.iter()
        .filter_map(|row| {
            let value = text(row, "decade")?;
            let decade = if value == vocab.undetermined_decade {
                Decade::Undetermined
            } else {
                Decade::parse(value).ok()?
            };
            Some(DecadeCount {
                key: decade.key(),
                label: DecadeCount::label_for(decade, vocab),
                total: count(row, "total"),
            })
        })
        .collect()
}

/// A work's detail, without its depicted subjects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorkDetail {
    pub qid: String,
    pub label: String,
    #[ts(optional)]
    pub image: Option<String>,
    /// `Século XIX`, `Década de 1820` or a year
    #[ts(optional)]
    pub date: Option<String>,
    pub instances: Vec<EntityRef>,
    pub creators: Vec<EntityRef>,
    pub materials: Vec<EntityRef>,
    pub commissioners: Vec<EntityRef>,
}

impl WorkDetail {
    /// Placeholder for a work the query service knows nothing about
    pub fn empty(qid: &str) -> Self {
        Self {
            qid: qid.to_string(),
            label: qid.to_string(),
            image: None,
            date: None,
            instances: Vec::new(),
            creators: Vec::new(),
            materials: Vec::new(),
            commissioners: Vec::new(),
        }
    }

    pub fn from_binding(row: &Binding, vocab: &Vocabulary) -> Option<Self> {
        let qid = qid_of(row, "work")?;
        let date = text(row, "year_precision").and_then(|value| {
            let (year, precision) = value.split_once('|').unwrap_or((value, ""));
            let year = year.parse::<i32>().ok()?;
            Some(match precision.parse::<u8>() {
                Ok(precision) => format_date(year, precision, vocab),
                Err(_) => year.to_string(),
            })
        });
        let list = |name: &str| unflatten(text(row, name));
        Some(Self {
            label: label_or(row, "work_label", &qid),
            image: text(row, "image").map(str::to_string),
            date,
            instances: list("instances"),
            creators: list("creators"),
            materials: list("materials"),
            commissioners: list("commissioners"),
            qid,
        })
    }
}

/// A depicted subject as the query service sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepictRow {
    pub statement_id: String,
    pub qid: String,
    pub label: String,
    pub description: Option<String>,
    pub quantity: Option<u64>,
}

impl FromBinding for DepictRow {
    fn from_binding(row: &Binding) -> Option<Self> {
        let statement_id = statement_id_from_uri(text(row, "statement")?)?;
        let qid = qid_of(row, "depict")?;
        Some(Self {
            statement_id,
            label: label_or(row, "depict_label", &qid),
            description: text(row, "depict_description").map(str::to_string),
            quantity: text(row, "quantity").and_then(parse_count),
            qid,
        })
    }
}

/// Sub-collection labels repeat this word; the tutorial chart drops it.
const COLLECTION_PREFIX: &str = "Coleção ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TutorialCollection {
    pub label: String,
    #[ts(type = "number")]
    pub total: u64,
}

impl FromBinding for TutorialCollection {
    fn from_binding(row: &Binding) -> Option<Self> {
        let label = text(row, "item_label")?;
        Some(Self {
            label: label
                .strip_prefix(COLLECTION_PREFIX)
                .unwrap_or(label)
                .to_string(),
            total: count(row, "total"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TutorialImage {
    pub image: String,
    #[ts(type = "number")]
    pub total: u64,
}

impl FromBinding for TutorialImage {
    fn from_binding(row: &Binding) -> Option<Self> {
        Some(Self {
            image: text(row, "image")?.to_string(),
            total: count(row, "total"),
        })
    }
}

/// `?total` of a single-row count query
pub fn single_total(rows: &[Binding]) -> u64 {
    rows.first().map(|row| count(row, "total")).unwrap_or(0)
}

/// `?work` of the random-pick query
pub fn first_qid(rows: &[Binding]) -> Option<Qid> {
    rows.iter()
        .find_map(|row| text(row, "work").and_then(|uri| Qid::parse(uri).ok()))
}
