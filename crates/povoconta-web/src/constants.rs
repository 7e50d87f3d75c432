// --- Session ---

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "povoconta_session";

/// Length of generated session ids.
pub const SESSION_ID_LENGTH: usize = 32;

/// Upper bound on live sessions kept in memory.
pub const MAX_SESSIONS: u64 = 100_000;

// --- Flash messages ---

/// Shown when the OAuth callback arrives without a pending login.
pub const FLASH_CALLBACK_WITHOUT_LOGIN: &str = "OAuth callback failed. Are cookies disabled?";

/// Shown when the provider rejects the handshake.
pub const FLASH_LOGIN_FAILED: &str = "Login with Wikidata failed. Please try again.";

/// Shown when a login cannot be started.
pub const FLASH_LOGIN_UNAVAILABLE: &str = "Could not reach Wikidata to log in.";

// --- Edits ---

/// Edit summary attached to every qualifier change.
pub const EDIT_SUMMARY: &str = "#povoconta quantity of depicted subject";

/// Form field carrying the back-navigation target.
pub const GOBACK_FIELD: &str = "goback";

// --- Search ---

/// Number of results returned by the search endpoint.
pub const SEARCH_LIMIT: u32 = 10;

/// Minimum length for search terms.
pub const MIN_SEARCH_TERM_LENGTH: usize = 2;
