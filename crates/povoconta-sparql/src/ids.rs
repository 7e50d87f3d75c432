//! Validated identifiers interpolated into query text

use std::fmt;
use std::str::FromStr;

use wikidata_client::entity_id_from_uri;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Qid(String),
    Language(String),
    Decade(String),
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qid(s) => write!(f, "not a Wikidata item id: {:?}", s),
            Self::Language(s) => write!(f, "not a language code: {:?}", s),
            Self::Decade(s) => write!(f, "not a decade: {:?}", s),
        }
    }
}

impl std::error::Error for IdError {}

/// A Wikidata item id such as `Q56677470`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qid(String);

impl Qid {
    /// Accepts `Q<digits>`, optionally behind the entity URI prefix.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        let id = entity_id_from_uri(input.trim());
        let valid = id
            .strip_prefix('Q')
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
        if valid {
            Ok(Self(id.to_string()))
        } else {
            Err(IdError::Qid(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `wd:Q…` prefixed name
    pub fn wd(&self) -> String {
        format!("wd:{}", self.0)
    }
}

impl fmt::Display for Qid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Qid {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lowercase language code such as `pt-br`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub const DEFAULT: &'static str = "pt-br";
    pub const FALLBACK: &'static str = "pt";

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let code = input.trim().to_ascii_lowercase();
        let valid = !code.is_empty()
            && code.len() <= 16
            && code.starts_with(|c: char| c.is_ascii_lowercase())
            && code.chars().all(|c| c.is_ascii_lowercase() || c == '-');
        if valid {
            Ok(Self(code))
        } else {
            Err(IdError::Language(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language chain for the label service: requested, then `pt-br`, `pt`, `en`.
    pub fn label_chain(&self) -> String {
        let mut chain = vec![self.0.as_str()];
        for code in wikidata_client::LABEL_FALLBACKS {
            if !chain.contains(&code) {
                chain.push(code);
            }
        }
        chain.join(",")
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decade bucket of the inception-date listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decade {
    /// First year of the decade, e.g. 1820
    Year(i32),
    /// Dates known only to the century or coarser
    Undetermined,
}

impl Decade {
    /// Path segment used for [`Decade::Undetermined`]
    pub const UNDETERMINED_KEY: &'static str = "undetermined";

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let input = input.trim();
        if input.eq_ignore_ascii_case(Self::UNDETERMINED_KEY) {
            return Ok(Self::Undetermined);
        }
        match input.parse::<i32>() {
            Ok(year) if year.rem_euclid(10) == 0 => Ok(Self::Year(year)),
            _ => Err(IdError::Decade(input.to_string())),
        }
    }

    /// Stable key, as used in URLs and the `?decade` variable
    pub fn key(&self) -> String {
        match self {
            Self::Year(year) => year.to_string(),
            Self::Undetermined => Self::UNDETERMINED_KEY.to_string(),
        }
    }
}

impl fmt::Display for Decade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Quote a string as a SPARQL literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
