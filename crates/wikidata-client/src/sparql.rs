//! SPARQL JSON result parsing

use std::collections::HashMap;

use serde::Deserialize;

use crate::fetched::Fetched;

const ENTITY_PREFIX: &str = "http://www.wikidata.org/entity/";

/// One typed value in a result row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
}

/// One result row: variable name -> value. Unbound variables are absent.
pub type Binding = HashMap<String, BindingValue>;

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<Binding>,
}

/// Parse a `format=json` response body into its rows.
pub fn parse_sparql_response(body: &str) -> Fetched<Vec<Binding>> {
    match serde_json::from_str::<SparqlResponse>(body) {
        Ok(response) if response.results.bindings.is_empty() => Fetched::Empty,
        Ok(response) => Fetched::Found(response.results.bindings),
        Err(e) => Fetched::Malformed(e.to_string()),
    }
}

/// Last path segment of an entity URI (`http://www.wikidata.org/entity/Q42` -> `Q42`).
pub fn entity_id_from_uri(uri: &str) -> &str {
    uri.strip_prefix(ENTITY_PREFIX)
        .unwrap_or_else(|| uri.rsplit('/').next().unwrap_or(uri))
}
