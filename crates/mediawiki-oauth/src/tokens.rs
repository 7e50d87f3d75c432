use std::fmt;

use serde::{Deserialize, Serialize};

/// Key/secret pair as issued by `Special:OAuth`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCredentials {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

macro_rules! token_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub key: String,
            pub secret: String,
        }

        impl $name {
            pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
                Self {
                    key: key.into(),
                    secret: secret.into(),
                }
            }

            pub fn credentials(&self) -> TokenCredentials {
                TokenCredentials {
                    key: self.key.clone(),
                    secret: self.secret.clone(),
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("key", &self.key)
                    .field("secret", &"<redacted>")
                    .finish()
            }
        }
    };
}

token_type!(
    /// Application credentials registered on the wiki
    ConsumerToken
);

token_type!(
    /// Temporary token issued by `Special:OAuth/initiate`
    RequestToken
);

token_type!(
    /// Long-lived token issued by `Special:OAuth/token`
    AccessToken
);
