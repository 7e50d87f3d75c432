use super::{in_scope, label_service};
use crate::ids::{LanguageCode, Qid};

/// Multi-valued properties of the detail view: (variable, property, list name)
const DETAIL_LISTS: [(&str, &str, &str); 4] = [
    ("instance", "P31", "instances"),
    ("creator", "P170", "creators"),
    ("material", "P186", "materials"),
    ("commissioner", "P88", "commissioners"),
];

/// Everything shown about a single work apart from its depicted subjects.
///
/// Multi-valued properties come back as `;`-joined `id|label` pairs, so two
/// entities sharing a label stay apart. The date is `year|precision` taken
/// from one P571 statement; the mapper turns it into a century, decade or
/// year label.
pub fn work_data(work: &Qid, lang: &LanguageCode) -> String {
    let mut select = String::new();
    let mut patterns = String::new();
    let mut labelled = vec!["work"];
    for (var, prop, list) in DETAIL_LISTS {
        select.push_str(&format!(
            "(GROUP_CONCAT(DISTINCT CONCAT(STRAFTER(STR(?{var}), STR(wd:)), \"|\", ?{var}_label); \
             separator=\";\") AS ?{list}) "
        ));
        patterns.push_str(&format!("OPTIONAL {{ ?work wdt:{prop} ?{var}. }} "));
        labelled.push(var);
    }
    format!(
        "SELECT ?work ?work_label (SAMPLE(?p18) AS ?image) (SAMPLE(?dating) AS ?year_precision) \
         {select}WHERE {{ \
         BIND({work} AS ?work) \
         ?work schema:version ?version. \
         OPTIONAL {{ ?work wdt:P18 ?p18. }} \
         OPTIONAL {{ ?work p:P571/psv:P571 ?inception. \
         ?inception wikibase:timeValue ?date; wikibase:timePrecision ?time_precision. \
         BIND(CONCAT(STR(YEAR(?date)), \"|\", STR(?time_precision)) AS ?dating) }} \
         {patterns}\
         {labels} \
         }} GROUP BY ?work ?work_label",
        work = work.wd(),
        labels = label_service(lang, &labelled),
    )
}

/// Depicted subjects of a work: statement node, subject, label,
/// description and the current quantity if any.
pub fn work_depicts(work: &Qid, lang: &LanguageCode) -> String {
    format!(
        "SELECT ?statement ?depict ?depict_label ?depict_description ?quantity WHERE {{ \
         {work} p:P180 ?statement. \
         ?statement ps:P180 ?depict. \
         OPTIONAL {{ ?statement pq:P1114 ?quantity. }} \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{chain}\". \
         ?depict rdfs:label ?depict_label. ?depict schema:description ?depict_description. }} \
         }} ORDER BY ?depict_label",
        work = work.wd(),
        chain = lang.label_chain(),
    )
}

/// One random in-scope work other than `current`.
///
/// Hashing the seeded `RAND()` with the work IRI gives a fresh order on
/// every call even when the service caches the query text.
pub fn next_qid(root: &Qid, current: &Qid, seed: f64) -> String {
    format!(
        "SELECT ?work (MD5(CONCAT(STR({seed} * RAND()), STR(?work))) AS ?random_hash) WHERE {{ \
         {scope} \
         MINUS {{ VALUES ?work {{ {current} }} }} \
         }} ORDER BY ?random_hash LIMIT 1",
        scope = in_scope(root),
        current = current.wd(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_data_lists() {
        let query = work_data(&Qid::parse("Q59247460").unwrap(), &LanguageCode::default());
        assert!(query.contains("BIND(wd:Q59247460 AS ?work)"));
        for list in ["?instances", "?creators", "?materials", "?commissioners"] {
            assert!(query.contains(&format!("AS {list})")), "missing {list}");
        }
        assert!(query.contains("wdt:P186 ?material"));
        assert!(query.contains("wdt:P88 ?commissioner"));
        assert!(query.contains("?commissioner rdfs:label ?commissioner_label"));
        assert!(query.contains(
            "GROUP_CONCAT(DISTINCT CONCAT(STRAFTER(STR(?material), STR(wd:)), \"|\", ?material_label)"
        ));
        assert!(query.contains("(SAMPLE(?p18) AS ?image)"));
    }

    #[test]
    fn test_work_data_dates_from_one_statement() {
        let query = work_data(&Qid::parse("Q1").unwrap(), &LanguageCode::default());
        assert!(query.contains("(SAMPLE(?dating) AS ?year_precision)"));
        assert!(query.contains("BIND(CONCAT(STR(YEAR(?date)), \"|\", STR(?time_precision)) AS ?dating)"));
    }

    #[test]
    fn test_work_depicts_selects_statement_and_quantity() {
        let query = work_depicts(&Qid::parse("Q5").unwrap(), &LanguageCode::default());
        assert!(query.contains("wd:Q5 p:P180 ?statement"));
        assert!(query.contains("pq:P1114 ?quantity"));
        assert!(query.contains("schema:description ?depict_description"));
    }

    #[test]
    fn test_next_qid_excludes_current_and_embeds_seed() {
        let query = next_qid(
            &Qid::parse("Q56677470").unwrap(),
            &Qid::parse("Q123").unwrap(),
            0.4375,
        );
        assert!(query.contains("MINUS { VALUES ?work { wd:Q123 } }"));
        assert!(query.contains("STR(0.4375 * RAND())"));
        assert!(query.ends_with("ORDER BY ?random_hash LIMIT 1"));
    }
}
