//! Signed-token codec: compact JWS with a symmetric MAC.
//!
//! Decode failures are classified so the middleware can treat an expired
//! access token differently from a malformed or forged one.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::claims::Claims;
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

/// Serialize and sign a claim. Fails only on key-material problems, which
/// are configuration errors, not request errors.
pub fn encode_claims(claims: &Claims, security: &SecurityConfig) -> Result<String, AppError> {
    encode(
        &Header::new(security.algorithm),
        claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("failed to encode token: {e}")))
}

/// Verify signature and expiry, returning the embedded claim.
///
/// Clocks are assumed synchronized: no skew leeway is granted.
pub fn decode_claims(token: &str, security: &SecurityConfig) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(security.algorithm);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn claims_valid_for(secs: i64) -> Claims {
        let iat = now_secs();
        Claims {
            sub: "42".to_string(),
            iat,
            exp: iat + secs,
        }
    }

    #[test]
    fn roundtrip_preserves_claims() {
        let security = SecurityConfig::new(b"codec_test_secret".to_vec());
        let claims = claims_valid_for(600);

        let token = encode_claims(&claims, &security).unwrap();
        let decoded = decode_claims(&token, &security).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id(), Some(42));
    }

    #[test]
    fn expired_token_is_classified_expired() {
        let security = SecurityConfig::new(b"codec_test_secret".to_vec());
        let iat = now_secs() - 600;
        let claims = Claims {
            sub: "42".to_string(),
            iat,
            exp: iat + 60,
        };

        let token = encode_claims(&claims, &security).unwrap();
        assert_eq!(decode_claims(&token, &security), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let security_a = SecurityConfig::new(b"secret-A".to_vec());
        let security_b = SecurityConfig::new(b"secret-B".to_vec());

        let token = encode_claims(&claims_valid_for(600), &security_a).unwrap();
        assert_eq!(
            decode_claims(&token, &security_b),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_signature_never_yields_claims() {
        let security = SecurityConfig::new(b"codec_test_secret".to_vec());
        let token = encode_claims(&claims_valid_for(600), &security).unwrap();

        // Flip one character in the signature segment.
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            decode_claims(&tampered, &security),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let security = SecurityConfig::new(b"codec_test_secret".to_vec());
        assert_eq!(
            decode_claims("not-a-token", &security),
            Err(TokenError::Malformed)
        );
        assert_eq!(decode_claims("", &security), Err(TokenError::Malformed));
    }
}
