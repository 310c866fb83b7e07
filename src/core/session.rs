use crate::core::error::{FxError, Result};

/// The user a sequence of portfolio operations acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
}

impl Session {
    /// Usernames are case-insensitive: surrounding whitespace is dropped and
    /// the name is lower-cased.
    pub fn new(username: &str) -> Result<Self> {
        let username = normalize_username(username);
        let valid = !username.is_empty()
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(FxError::InvalidUsername(username));
        }
        Ok(Self { username })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
