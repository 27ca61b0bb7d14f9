//! Strongly-typed identifier value objects.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

const SESSION_ID_PREFIX: &str = "session_";
const SESSION_ID_BYTES: usize = 16;

/// Opaque, unguessable identifier for a preview session.
///
/// Doubles as the URL component of the preview page, so it carries
/// 128 bits from the thread-local CSPRNG (seeded from the OS).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PreviewSessionId(String);

impl PreviewSessionId {
    /// Generates a fresh random session ID.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::rng().fill(&mut bytes);
        Self(format!("{}{}", SESSION_ID_PREFIX, hex::encode(bytes)))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PreviewSessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix(SESSION_ID_PREFIX)
            .ok_or_else(|| ValidationError::invalid_format("session_id", "missing prefix"))?;

        let well_formed = hex_part.len() == SESSION_ID_BYTES * 2
            && hex_part
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        if !well_formed {
            return Err(ValidationError::invalid_format(
                "session_id",
                "expected 32 lowercase hex characters",
            ));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for PreviewSessionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PreviewSessionId> for String {
    fn from(id: PreviewSessionId) -> Self {
        id.0
    }
}

/// Unique identifier for one attached viewer connection.
///
/// Generated server-side on every attach, so a reconnect on the same
/// session always gets a new ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(Uuid);

impl ViewerId {
    /// Creates a new random viewer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
