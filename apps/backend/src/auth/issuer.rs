//! Token issuance and the refresh-rotation decision.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::claims::Claims;
use crate::auth::jwt::{decode_claims, encode_claims};
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

fn unix_secs(now: SystemTime) -> Result<i64, AppError> {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| AppError::internal("system clock before Unix epoch".to_string()))
}

fn mint(
    user_id: i64,
    now: SystemTime,
    lifetime_secs: i64,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = unix_secs(now)?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat,
        exp: iat + lifetime_secs,
    };
    encode_claims(&claims, security)
}

/// Short-lived token carried in the `Authorization` header.
pub fn mint_access_token(
    user_id: i64,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    mint(user_id, now, security.access_ttl.as_secs() as i64, security)
}

/// Long-lived token carried in the refresh cookie.
pub fn mint_refresh_token(
    user_id: i64,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    mint(user_id, now, security.refresh_ttl.as_secs() as i64, security)
}

/// True when the refresh token's remaining lifetime has fallen inside the
/// rotation window. Any decode failure means "do not rotate": an unusable
/// token must not trigger re-issuance.
pub fn should_rotate(refresh_token: &str, now: SystemTime, security: &SecurityConfig) -> bool {
    let Ok(claims) = decode_claims(refresh_token, security) else {
        return false;
    };
    let Ok(now) = unix_secs(now) else {
        return false;
    };
    claims.exp - now < security.rotation_window.as_secs() as i64
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::auth::jwt::decode_claims;

    fn security() -> SecurityConfig {
        SecurityConfig::new(b"issuer_test_secret".to_vec())
    }

    #[test]
    fn access_and_refresh_lifetimes_follow_config() {
        let security = security();
        let now = SystemTime::now();

        let access = mint_access_token(7, now, &security).unwrap();
        let refresh = mint_refresh_token(7, now, &security).unwrap();

        let access = decode_claims(&access, &security).unwrap();
        let refresh = decode_claims(&refresh, &security).unwrap();

        assert_eq!(access.sub, "7");
        assert_eq!(
            access.exp - access.iat,
            security.access_ttl.as_secs() as i64
        );
        assert_eq!(
            refresh.exp - refresh.iat,
            security.refresh_ttl.as_secs() as i64
        );
        assert!(access.exp < refresh.exp);
    }

    #[test]
    fn fresh_refresh_token_does_not_rotate() {
        let security = security();
        let token = mint_refresh_token(7, SystemTime::now(), &security).unwrap();
        assert!(!should_rotate(&token, SystemTime::now(), &security));
    }

    #[test]
    fn refresh_token_inside_window_rotates() {
        let security = security();
        // Issued far enough in the past that less than the rotation window
        // remains, while the token itself is still valid.
        let issued = SystemTime::now() - (security.refresh_ttl - Duration::from_secs(3600));
        let token = mint_refresh_token(7, issued, &security).unwrap();
        assert!(should_rotate(&token, SystemTime::now(), &security));
    }

    #[test]
    fn undecodable_token_never_rotates() {
        let security = security();
        assert!(!should_rotate("garbage", SystemTime::now(), &security));

        let other = SecurityConfig::new(b"other_secret".to_vec());
        let forged = mint_refresh_token(7, SystemTime::now(), &other).unwrap();
        assert!(!should_rotate(&forged, SystemTime::now(), &security));
    }
}
