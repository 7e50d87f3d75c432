use super::{in_scope, label_service};
use crate::ids::{escape_literal, Decade, LanguageCode, Qid};

/// Binds `?decade` to the decade's first year, or to the sentinel when the
/// inception is only known to the century or coarser.
fn decade_of(sentinel: &str) -> String {
    format!(
        "?work p:P571/psv:P571 ?inception. \
         ?inception wikibase:timeValue ?value; wikibase:timePrecision ?precision. \
         BIND(IF(?precision <= 7, {sentinel}, STR(xsd:integer(10 * FLOOR(YEAR(?value) / 10)))) AS ?decade)",
        sentinel = escape_literal(sentinel),
    )
}

/// Decades with in-scope works, sentinel bucket included.
pub fn per_decade(root: &Qid, sentinel: &str) -> String {
    format!(
        "SELECT ?decade (COUNT(DISTINCT ?work) AS ?total) WHERE {{ \
         {scope} \
         {decade} \
         }} GROUP BY ?decade ORDER BY ?decade",
        scope = in_scope(root),
        decade = decade_of(sentinel),
    )
}

/// In-scope works of one decade (or of the sentinel bucket).
pub fn works_of_decade(root: &Qid, decade: Decade, lang: &LanguageCode, sentinel: &str) -> String {
    let wanted = match decade {
        Decade::Year(year) => escape_literal(&year.to_string()),
        Decade::Undetermined => escape_literal(sentinel),
    };
    format!(
        "SELECT ?work ?work_label (SAMPLE(?p18) AS ?image) (COUNT(DISTINCT ?depict) AS ?total) WHERE {{ \
         {scope} \
         {decade} \
         FILTER(?decade = {wanted}) \
         {labels} \
         }} GROUP BY ?work ?work_label ORDER BY ?total ?work_label",
        scope = in_scope(root),
        decade = decade_of(sentinel),
        labels = label_service(lang, &["work"]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: &str = "Década indeterminada";

    #[test]
    fn test_per_decade_uses_sentinel() {
        let query = per_decade(&Qid::parse("Q1").unwrap(), SENTINEL);
        assert!(query.contains("IF(?precision <= 7, \"Década indeterminada\""));
        assert!(query.contains("GROUP BY ?decade"));
    }

    #[test]
    fn test_works_of_decade_filters() {
        let root = Qid::parse("Q1").unwrap();
        let lang = LanguageCode::default();
        let query = works_of_decade(&root, Decade::Year(1820), &lang, SENTINEL);
        assert!(query.contains("FILTER(?decade = \"1820\")"));

        let query = works_of_decade(&root, Decade::Undetermined, &lang, SENTINEL);
        assert!(query.contains("FILTER(?decade = \"Década indeterminada\")"));
    }

    #[test]
    fn test_sentinel_is_escaped() {
        let query = per_decade(&Qid::parse("Q1").unwrap(), "x\") } DROP {");
        assert!(query.contains("\"x\\\") } DROP {\""));
    }
}
