//! Rust client for Wikidata and Wikimedia Commons
//!
//! Covers the pieces a crowdsourcing tool needs to read artwork metadata and
//! write quantity qualifiers back:
//!
//! ## Wikidata Query Service
//! - `POST /sparql` with `format=json` - SPARQL SELECT queries
//!
//! ## Wikidata action API
//! - `action=wbgetentities` - labels, claims (P18 image, P180 depicts + P1114 quantity)
//! - `action=wbsearchentities` - item search
//! - `action=query&meta=tokens` - CSRF tokens (OAuth-signed)
//! - `action=wbsetqualifier` / `action=wbremovequalifiers` - qualifier edits (OAuth-signed)
//!
//! ## Commons API
//! - `action=query&prop=imageinfo` - current URL of a file
//!
//! Reads return [`Fetched`], which keeps "upstream had nothing" apart from
//! "upstream sent something we could not read"; transport failures are
//! [`WikidataError`]s.

mod client;
mod commons;
mod edit;
mod entities;
mod error;
mod fetched;
mod retry;
mod sparql;

pub use client::{ClientConfig, Endpoints, WikidataClient};
pub use commons::parse_image_url;
pub use edit::{Editor, QualifierChange, PROP_QUANTITY};
pub use entities::{
    parse_entities, parse_search, pick_label, Claim, DataValue, DepictedClaim, DepictedSubject,
    Entity, LangValue, SearchHit, Snak, LABEL_FALLBACKS, PROP_DEPICTS, PROP_IMAGE,
};
pub use error::{Result, WikidataError};
pub use fetched::Fetched;
pub use retry::RetryPolicy;
pub use sparql::{entity_id_from_uri, parse_sparql_response, Binding, BindingValue};
