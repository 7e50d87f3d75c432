use super::{in_scope, label_service};
use crate::ids::{LanguageCode, Qid};

/// Sub-collections of the museum with their in-scope work counts.
pub fn per_collection(root: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?item ?item_label (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         {scope} \
         ?work wdt:P195 ?item. \
         FILTER(?item != {root}) \
         {labels} \
         }} GROUP BY ?item ?item_label ORDER BY DESC(?total)",
        scope = in_scope(root),
        root = root.wd(),
        labels = label_service(lang, &["item"]),
    )
}

/// Header of a collection page: label, Commons category, pt Wikipedia
/// article, named-after entity and the two work counts.
pub fn collection_data(collection: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?collection ?collection_label ?collection_category ?collection_article \
         ?named_after ?named_after_label ?named_after_article \
         (COUNT(DISTINCT ?work) AS ?total) (COUNT(DISTINCT ?work_scope) AS ?total_scope) WHERE {{ \
         BIND({collection} AS ?collection) \
         OPTIONAL {{ ?commons_page schema:about ?collection; schema:name ?collection_category; \
         schema:isPartOf <https://commons.wikimedia.org/>. }} \
         OPTIONAL {{ ?collection_page schema:about ?collection; schema:name ?collection_article; \
         schema:isPartOf <https://pt.wikipedia.org/>. }} \
         OPTIONAL {{ ?collection wdt:P138 ?named_after. \
         OPTIONAL {{ ?named_after_page schema:about ?named_after; schema:name ?named_after_article; \
         schema:isPartOf <https://pt.wikipedia.org/>. }} }} \
         OPTIONAL {{ ?work wdt:P195 ?collection. \
         OPTIONAL {{ ?work wdt:P18 ?image; wdt:P180 ?depict. BIND(?work AS ?work_scope) }} }} \
         {labels} \
         }} GROUP BY ?collection ?collection_label ?collection_category ?collection_article \
         ?named_after ?named_after_label ?named_after_article",
        collection = collection.wd(),
        labels = label_service(lang, &["collection", "named_after"]),
    )
}

/// In-scope works of a collection with how many of their depicted subjects
/// already carry a quantity.
pub fn works_in_collection(root: &Qid, collection: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?work ?work_label (SAMPLE(?p18) AS ?image) \
         (COUNT(DISTINCT ?quantified) AS ?total) WHERE {{ \
         {scope} \
         ?work wdt:P195 {collection}. \
         OPTIONAL {{ ?work p:P180 ?quantified. ?quantified pq:P1114 ?quantity. }} \
         {labels} \
         }} GROUP BY ?work ?work_label ORDER BY ?total ?work_label",
        scope = in_scope(root),
        collection = collection.wd(),
        labels = label_service(lang, &["work"]),
    )
}
