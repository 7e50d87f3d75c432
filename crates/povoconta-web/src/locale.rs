use povoconta_sparql::LanguageCode;

use crate::session::SessionState;

/// Display languages the service offers
#[derive(Debug, Clone)]
pub struct Locales {
    supported: Vec<LanguageCode>,
    default: LanguageCode,
}

impl Locales {
    pub fn new(mut supported: Vec<LanguageCode>, default: LanguageCode) -> Self {
        if !supported.contains(&default) {
            supported.push(default.clone());
        }
        Self { supported, default }
    }

    pub fn supported(&self) -> &[LanguageCode] {
        &self.supported
    }

    fn find(&self, code: &str) -> Option<&LanguageCode> {
        let code = LanguageCode::parse(code).ok()?;
        self.supported.iter().find(|s| **s == code)
    }

    /// Pick the language for a request: `?lang=` (remembered in the session
    /// when supported), then the session, then `Accept-Language`, then the
    /// default.
    pub fn select(
        &self,
        requested: Option<&str>,
        session: &mut SessionState,
        accept_language: Option<&str>,
    ) -> LanguageCode {
        if let Some(code) = requested.and_then(|r| self.find(r)) {
            session.lang = Some(code.clone());
            return code.clone();
        }
        if let Some(code) = session.lang.as_ref().and_then(|l| self.find(l.as_str())) {
            return code.clone();
        }
        accept_language
            .and_then(|header| self.negotiate(header))
            .unwrap_or_else(|| self.default.clone())
    }

    /// First supported entry of an `Accept-Language` header. A region
    /// variant (`pt-PT`) matches its base language (`pt`).
    pub fn negotiate(&self, header: &str) -> Option<LanguageCode> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(str::trim)
            .find_map(|tag| {
                self.find(tag)
                    .or_else(|| tag.split('-').next().and_then(|base| self.find(base)))
            })
            .cloned()
    }
}
