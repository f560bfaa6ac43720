use std::fmt;

use serde::Serialize;

/// Message shown when a form is submitted with an empty field.
pub const MISSING_FIELDS_MESSAGE: &str = "Username and password required";

/// Username and password for a single login or signup submit.
///
/// Serializes to the `{username, password}` JSON body both endpoints expect.
#[derive(Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject empty fields before anything goes over the wire.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            Err(MISSING_FIELDS_MESSAGE)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
