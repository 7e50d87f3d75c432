use super::{in_scope, label_service};
use crate::ids::{LanguageCode, Qid};

/// "Photograph" as a generic type; every photo in the collection has it and
/// it drowns the more specific types.
pub const EXCLUDED_INSTANCE: &str = "Q18593264";

/// Instance-of types of in-scope works, with counts.
pub fn per_instance(root: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?item ?item_label (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         {scope} \
         ?work wdt:P31 ?item. \
         FILTER(?item != wd:{excluded}) \
         {labels} \
         }} GROUP BY ?item ?item_label ORDER BY DESC(?total)",
        scope = in_scope(root),
        excluded = EXCLUDED_INSTANCE,
        labels = label_service(lang, &["item"]),
    )
}

/// In-scope works of a type, directly or through their parent work.
pub fn works_of_instance(root: &Qid, instance: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?work ?work_label (SAMPLE(?p18) AS ?image) (COUNT(DISTINCT ?depict) AS ?total) WHERE {{ \
         {scope} \
         {{ ?work wdt:P31 {instance}. }} UNION {{ ?parent wdt:P31 {instance}. ?work wdt:P195 ?parent. }} \
         {labels} \
         }} GROUP BY ?work ?work_label ORDER BY ?total ?work_label",
        scope = in_scope(root),
        instance = instance.wd(),
        labels = label_service(lang, &["work"]),
    )
}
