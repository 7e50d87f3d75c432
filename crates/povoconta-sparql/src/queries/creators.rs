use super::label_service;
use crate::ids::{LanguageCode, Qid};

/// Creator of the work itself, or of the parent work it is part of
/// (photo albums, print series).
fn created_by(root: &Qid, creator: &str) -> String {
    format!(
        "?work wdt:P195 {root}; wdt:P18 ?p18; wdt:P180 ?depict. \
         {{ ?work wdt:P170 {creator}. }} UNION {{ ?parent wdt:P170 {creator}. ?work wdt:P195 ?parent. }}",
        root = root.wd(),
    )
}

/// Creators with their in-scope work counts.
pub fn per_creator(root: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?item ?item_label (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         {pattern} \
         {labels} \
         }} GROUP BY ?item ?item_label ORDER BY DESC(?total)",
        pattern = created_by(root, "?item"),
        labels = label_service(lang, &["item"]),
    )
}

/// Header of a creator page: label, pt Wikipedia article, total works in the
/// museum and how many of them are in scope.
pub fn creator_data(root: &Qid, creator: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?creator ?creator_label ?creator_article \
         (COUNT(DISTINCT ?work) AS ?total) (COUNT(DISTINCT ?work_scope) AS ?total_scope) WHERE {{ \
         BIND({creator} AS ?creator) \
         OPTIONAL {{ ?creator_page schema:about ?creator; schema:inLanguage \"pt\"; \
         schema:name ?creator_article. }} \
         OPTIONAL {{ ?work wdt:P195 {root}. \
         {{ ?work wdt:P170 ?creator. }} UNION {{ ?parent wdt:P170 ?creator. ?work wdt:P195 ?parent. }} \
         OPTIONAL {{ ?work wdt:P18 ?image; wdt:P180 ?depict. BIND(?work AS ?work_scope) }} }} \
         {labels} \
         }} GROUP BY ?creator ?creator_label ?creator_article",
        creator = creator.wd(),
        root = root.wd(),
        labels = label_service(lang, &["creator"]),
    )
}

/// In-scope works of a creator with their depicted-subject counts.
pub fn works_of_creator(root: &Qid, creator: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?work ?work_label (SAMPLE(?p18) AS ?image) (COUNT(DISTINCT ?depict) AS ?total) WHERE {{ \
         {pattern} \
         {labels} \
         }} GROUP BY ?work ?work_label ORDER BY ?total ?work_label",
        pattern = created_by(root, &creator.wd()),
        labels = label_service(lang, &["work"]),
    )
}
