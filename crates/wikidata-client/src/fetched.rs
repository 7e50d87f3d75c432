/// Outcome of reading something from upstream.
///
/// `Empty` means the response was well-formed but had no data for us (zero
/// bindings, missing entity, no P18 claim). `Malformed` means the body could
/// not be read as the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    Empty,
    Malformed(String),
}

impl<T> Fetched<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Found(value) => Fetched::Found(f(value)),
            Self::Empty => Fetched::Empty,
            Self::Malformed(reason) => Fetched::Malformed(reason),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Fetched<U>) -> Fetched<U> {
        match self {
            Self::Found(value) => f(value),
            Self::Empty => Fetched::Empty,
            Self::Malformed(reason) => Fetched::Malformed(reason),
        }
    }

    /// Degrade to "nothing shown".
    pub fn or_default(self) -> T
    where
        T: Default,
    {
        self.found().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Fetched<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Found(v),
            None => Self::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_default() {
        assert_eq!(Fetched::Found("a".to_string()).or_default(), "a");
        assert_eq!(Fetched::<String>::Empty.or_default(), "");
        assert_eq!(
            Fetched::<Vec<u8>>::Malformed("bad".into()).or_default(),
            Vec::<u8>::new()
        );
    }

    #[test]
    fn test_and_then_keeps_malformed_reason() {
        let fetched: Fetched<u32> = Fetched::Malformed("truncated".into());
        let mapped = fetched.and_then(|v| Fetched::Found(v + 1));
        assert_eq!(mapped, Fetched::Malformed("truncated".into()));
    }

    #[test]
    fn test_from_option() {
        assert!(Fetched::from(Some(1)).is_found());
        assert!(Fetched::<u8>::from(None).is_empty());
    }
}
