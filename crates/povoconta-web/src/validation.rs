use std::fmt;

/// Why a submitted quantity was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    Empty,
    Zero,
    NotAnInteger(String),
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no quantity given"),
            Self::Zero => write!(f, "quantity must be at least 1"),
            Self::NotAnInteger(value) => write!(f, "{:?} is not a whole number", value),
        }
    }
}

/// Validate a submitted quantity: a positive integer, surrounding blanks allowed.
pub fn validate_quantity(value: &str) -> Result<u64, QuantityError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(QuantityError::Empty);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QuantityError::NotAnInteger(value.to_string()));
    }
    match value.parse::<u64>() {
        Ok(0) => Err(QuantityError::Zero),
        Ok(n) => Ok(n),
        Err(_) => Err(QuantityError::NotAnInteger(value.to_string())),
    }
}

/// A form field name of the shape `statementID;qualifierHash`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    pub statement_id: String,
    /// Empty hash segment means no qualifier exists yet
    pub hash: Option<String>,
}

/// Split a field name on its last `;`. Names without `;` are not edit fields.
pub fn parse_field_key(name: &str) -> Option<FieldKey> {
    let (statement_id, hash) = name.rsplit_once(';')?;
    let statement_id = statement_id.trim();
    if statement_id.is_empty() {
        return None;
    }
    let hash = hash.trim();
    Some(FieldKey {
        statement_id: statement_id.to_string(),
        hash: (!hash.is_empty()).then(|| hash.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(""), Err(QuantityError::Empty));
        assert_eq!(validate_quantity("   "), Err(QuantityError::Empty));
        assert_eq!(validate_quantity("0"), Err(QuantityError::Zero));
        assert_eq!(validate_quantity("00"), Err(QuantityError::Zero));
        assert_eq!(validate_quantity("7"), Ok(7));
        assert_eq!(validate_quantity(" 12 "), Ok(12));
        assert!(matches!(validate_quantity("abc"), Err(QuantityError::NotAnInteger(_))));
        assert!(matches!(validate_quantity("-3"), Err(QuantityError::NotAnInteger(_))));
        assert!(matches!(validate_quantity("2.5"), Err(QuantityError::NotAnInteger(_))));
        assert!(matches!(validate_quantity("+4"), Err(QuantityError::NotAnInteger(_))));
    }

    #[test]
    fn test_parse_field_key() {
        assert_eq!(
            parse_field_key("Q123$abc-guid;HASH1"),
            Some(FieldKey {
                statement_id: "Q123$abc-guid".into(),
                hash: Some("HASH1".into()),
            })
        );
        assert_eq!(
            parse_field_key("Q123$abc-guid;"),
            Some(FieldKey {
                statement_id: "Q123$abc-guid".into(),
                hash: None,
            })
        );
        assert_eq!(parse_field_key("goback"), None);
        assert_eq!(parse_field_key(";HASH"), None);
    }

    #[test]
    fn test_parse_field_key_splits_on_last_separator() {
        let key = parse_field_key("a;b;c").unwrap();
        assert_eq!(key.statement_id, "a;b");
        assert_eq!(key.hash.as_deref(), Some("c"));
    }
}
