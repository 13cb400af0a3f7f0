//! Pulls raw tokens out of request metadata. Absence is a normal outcome,
//! never an error.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::HttpRequest;

use crate::state::security_config::SecurityConfig;

/// Name of the refresh-token cookie the frontend expects.
pub const REFRESH_COOKIE: &str = "my_blog_refresh_token";

/// Access token from `Authorization: Bearer <token>`.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Refresh token from the named cookie.
pub fn refresh_cookie(req: &HttpRequest) -> Option<String> {
    let cookie = req.cookie(REFRESH_COOKIE)?;
    let value = cookie.value();
    (!value.is_empty()).then(|| value.to_string())
}

/// HttpOnly + Secure cookie scoped to `/`, expiring with the token itself.
pub fn build_refresh_cookie(token: String, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token)
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(CookieDuration::seconds(
            security.refresh_ttl.as_secs() as i64
        ))
        .finish()
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn bearer_token_extracted_from_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn refresh_cookie_extracted_by_name() {
        let req = TestRequest::default()
            .cookie(Cookie::new(REFRESH_COOKIE, "tok"))
            .cookie(Cookie::new("other", "nope"))
            .to_http_request();
        assert_eq!(refresh_cookie(&req).as_deref(), Some("tok"));

        let req = TestRequest::default()
            .cookie(Cookie::new("other", "nope"))
            .to_http_request();
        assert_eq!(refresh_cookie(&req), None);
    }

    #[test]
    fn refresh_cookie_attributes() {
        let security = SecurityConfig::new(b"secret".to_vec());
        let cookie = build_refresh_cookie("tok".to_string(), &security);

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(CookieDuration::seconds(
                security.refresh_ttl.as_secs() as i64
            ))
        );
    }
}
