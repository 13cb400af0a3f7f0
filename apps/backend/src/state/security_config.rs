use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Token lifetimes and key material for the stateless auth layer.
///
/// Read-only after startup; shared across all requests without locking.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Symmetric secret used to sign and verify tokens. Never logged.
    pub jwt_secret: Vec<u8>,
    /// MAC algorithm (defaults to HS256).
    pub algorithm: Algorithm,
    /// Access token lifetime (short: minutes).
    pub access_ttl: Duration,
    /// Refresh token lifetime (long: days).
    pub refresh_ttl: Duration,
    /// Re-issue the refresh token once its remaining lifetime drops
    /// below this window.
    pub rotation_window: Duration,
}

const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(30 * 60);
const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_ROTATION_WINDOW: Duration = Duration::from_secs(3 * 24 * 60 * 60);

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            rotation_window: DEFAULT_ROTATION_WINDOW,
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn with_rotation_window(mut self, window: Duration) -> Self {
        self.rotation_window = window;
        self
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
