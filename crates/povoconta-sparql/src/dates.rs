//! Display labels for inception dates

use crate::ids::LanguageCode;

/// Wikidata time precision for centuries; coarser values are labelled the same way
pub const CENTURY_PRECISION: u8 = 7;
/// Wikidata time precision for decades
pub const DECADE_PRECISION: u8 = 8;

/// Per-language words used in date labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    pub century_prefix: &'static str,
    pub decade_prefix: &'static str,
    /// Bucket label for works whose decade is not known
    pub undetermined_decade: &'static str,
}

impl Vocabulary {
    pub const PORTUGUESE: Self = Self {
        century_prefix: "Século",
        decade_prefix: "Década de",
        undetermined_decade: "Década indeterminada",
    };

    pub const ENGLISH: Self = Self {
        century_prefix: "Century",
        decade_prefix: "Decade of",
        undetermined_decade: "Undetermined decade",
    };

    pub fn for_lang(lang: &LanguageCode) -> Self {
        if lang.as_str() == "en" || lang.as_str().starts_with("en-") {
            Self::ENGLISH
        } else {
            Self::PORTUGUESE
        }
    }
}

/// Roman numeral for 1..=3999
pub fn to_roman(mut n: u32) -> Option<String> {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n == 0 || n > 3999 {
        return None;
    }
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    Some(out)
}

/// Century a year belongs to: 1801..=1900 is the 19th.
pub fn century_of(year: i32) -> i32 {
    (year - 1).div_euclid(100) + 1
}

/// First year of the decade containing `year`
pub fn decade_of(year: i32) -> i32 {
    year - year.rem_euclid(10)
}

/// Label a year according to its precision: `Século XIX`, `Década de 1820` or `1822`.
pub fn format_date(year: i32, precision: u8, vocab: &Vocabulary) -> String {
    if precision <= CENTURY_PRECISION {
        let century = century_of(year);
        return match u32::try_from(century).ok().and_then(to_roman) {
            Some(roman) => format!("{} {}", vocab.century_prefix, roman),
            None => year.to_string(),
        };
    }
    if precision == DECADE_PRECISION {
        return format!("{} {}", vocab.decade_prefix, decade_of(year));
    }
    year.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(1).as_deref(), Some("I"));
        assert_eq!(to_roman(4).as_deref(), Some("IV"));
        assert_eq!(to_roman(19).as_deref(), Some("XIX"));
        assert_eq!(to_roman(1994).as_deref(), Some("MCMXCIV"));
        assert_eq!(to_roman(3999).as_deref(), Some("MMMCMXCIX"));
        assert_eq!(to_roman(0), None);
        assert_eq!(to_roman(4000), None);
    }

    #[test]
    fn test_century_of() {
        assert_eq!(century_of(1801), 19);
        assert_eq!(century_of(1850), 19);
        assert_eq!(century_of(1900), 19);
        assert_eq!(century_of(1901), 20);
    }

    #[test]
    fn test_format_date_by_precision() {
        let pt = Vocabulary::PORTUGUESE;
        assert_eq!(format_date(1850, 7, &pt), "Século XIX");
        assert_eq!(format_date(1822, 8, &pt), "Década de 1820");
        assert_eq!(format_date(1822, 9, &pt), "1822");
        assert_eq!(format_date(1822, 11, &pt), "1822");
        assert_eq!(format_date(1500, 6, &Vocabulary::ENGLISH), "Century XV");
    }

    #[test]
    fn test_century_before_common_era_prints_year() {
        assert_eq!(format_date(-300, 7, &Vocabulary::PORTUGUESE), "-300");
    }

    #[test]
    fn test_vocabulary_for_lang() {
        let en = LanguageCode::parse("en").unwrap();
        assert_eq!(Vocabulary::for_lang(&en), Vocabulary::ENGLISH);
        assert_eq!(Vocabulary::for_lang(&LanguageCode::default()), Vocabulary::PORTUGUESE);
    }
}
