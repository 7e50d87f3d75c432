//! SPARQL text for each view.
//!
//! Every builder takes validated ids ([`Qid`], [`LanguageCode`], [`Decade`]),
//! so nothing user-supplied reaches the query unchecked. Labels always come
//! from the label service with the chain `<lang>,pt-br,pt,en`; an item with
//! no label in any of those languages is labelled with its own id.
//!
//! Listing queries share variable names so one mapper serves them all:
//! facets select `?item ?item_label ?total`, work lists select
//! `?work ?work_label ?image ?total`.

mod collections;
mod creators;
mod decades;
mod depicts;
mod instances;
mod tutorial;
mod works;

pub use collections::{collection_data, per_collection, works_in_collection};
pub use creators::{creator_data, per_creator, works_of_creator};
pub use decades::{per_decade, works_of_decade};
pub use depicts::{per_depict, works_of_depict};
pub use instances::{per_instance, works_of_instance, EXCLUDED_INSTANCE};
pub use tutorial::{tutorial_collections, tutorial_images, tutorial_total, TutorialScope};
pub use works::{next_qid, work_data, work_depicts};

use crate::ids::{LanguageCode, Qid};

/// Explicit-mode label service binding `?<var>_label` for each variable
fn label_service(lang: &LanguageCode, vars: &[&str]) -> String {
    let mut clause = format!(
        "SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{}\". ",
        lang.label_chain()
    );
    for var in vars {
        clause.push_str(&format!("?{var} rdfs:label ?{var}_label. "));
    }
    clause.push('}');
    clause
}

/// A work of the museum with an image and at least one depicted subject
fn in_scope(root: &Qid) -> String {
    format!(
        "?work wdt:P195 {}; wdt:P18 ?p18; wdt:P180 ?depict.",
        root.wd()
    )
}
