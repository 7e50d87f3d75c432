use super::{in_scope, label_service};
use crate::ids::{LanguageCode, Qid};

/// Depicted subjects across in-scope works, with counts.
pub fn per_depict(root: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?item ?item_label (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         {scope} \
         BIND(?depict AS ?item) \
         {labels} \
         }} GROUP BY ?item ?item_label ORDER BY DESC(?total)",
        scope = in_scope(root),
        labels = label_service(lang, &["item"]),
    )
}

/// In-scope works depicting a subject.
pub fn works_of_depict(root: &Qid, subject: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?work ?work_label (SAMPLE(?p18) AS ?image) (COUNT(DISTINCT ?depict) AS ?total) WHERE {{ \
         {scope} \
         ?work wdt:P180 {subject}. \
         {labels} \
         }} GROUP BY ?work ?work_label ORDER BY ?total ?work_label",
        scope = in_scope(root),
        subject = subject.wd(),
        labels = label_service(lang, &["work"]),
    )
}
