use super::label_service;
use crate::ids::{LanguageCode, Qid};

/// Which works of the museum a tutorial counter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialScope {
    All,
    WithImage,
    WithDepicts,
    InScope,
}

impl TutorialScope {
    pub const ALL: [Self; 4] = [Self::All, Self::WithImage, Self::WithDepicts, Self::InScope];

    fn pattern(self) -> &'static str {
        match self {
            Self::All => "",
            Self::WithImage => "?work wdt:P18 ?image.",
            Self::WithDepicts => "?work wdt:P180 ?depict.",
            Self::InScope => "?work wdt:P18 ?image; wdt:P180 ?depict.",
        }
    }
}

/// Sub-collections of the museum with in-scope counts, for the tutorial chart.
pub fn tutorial_collections(root: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?item_label (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         ?work wdt:P195 {root}; wdt:P195 ?item; wdt:P18 ?image; wdt:P180 ?depict. \
         FILTER(?item != {root}) \
         {labels} \
         }} GROUP BY ?item_label ORDER BY DESC(?total)",
        root = root.wd(),
        labels = label_service(lang, &["item"]),
    )
}

/// Up to 20 example images from the tutorial collection.
pub fn tutorial_images(collection: &Qid, excluded: Option<&Qid>) -> String {
    let filter = excluded
        .map(|work| format!("FILTER(?work != {}) ", work.wd()))
        .unwrap_or_default();
    format!(
        "SELECT ?image (COUNT(DISTINCT ?depict) AS ?total) WHERE {{ \
         ?work wdt:P195 {collection}; wdt:P18 ?image; wdt:P180 ?depict. \
         {filter}\
         }} GROUP BY ?image ORDER BY ?total LIMIT 20",
        collection = collection.wd(),
    )
}

/// Number of works of the museum matching a scope.
pub fn tutorial_total(root: &Qid, scope: TutorialScope) -> String {
    format!(
        "SELECT (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         ?work wdt:P195 {root}. {pattern} \
         }}",
        root = root.wd(),
        pattern = scope.pattern(),
    )
}
