//! Payload carried by both access and refresh tokens.

use serde::{Deserialize, Serialize};

/// Identity claim minted by the issuer. Immutable once minted; refresh
/// produces a new claim rather than mutating this one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Stringified numeric user id.
    pub sub: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch); always strictly after `iat`.
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into the numeric user id it encodes.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}
