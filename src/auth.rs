use std::fmt;

use base64::prelude::*;

/// Username/password pair sent as an HTTP `Basic` authorization header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the `authorization` header value, `Basic <base64(user:pass)>`.
    pub fn header_value(&self) -> String {
        let credential = BASE64_STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {credential}")
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
