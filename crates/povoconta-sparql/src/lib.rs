//! Queries and view-models for browsing museum artworks on Wikidata
//!
//! [`queries`] builds one canonical SPARQL query per view; [`views`] turns the
//! resulting rows into serializable page models. Both sides agree on variable
//! names, so each query has a matching mapper:
//!
//! ```
//! use povoconta_sparql::{queries, LanguageCode, Qid};
//!
//! let root = Qid::parse("Q56677470").unwrap();
//! let query = queries::per_collection(&root, &LanguageCode::default());
//! assert!(query.contains("wd:Q56677470"));
//! ```

pub mod dates;
pub mod ids;
pub mod queries;
pub mod views;

pub use dates::{format_date, to_roman, Vocabulary};
pub use ids::{escape_literal, Decade, IdError, LanguageCode, Qid};
pub use views::{map_rows, FromBinding};
