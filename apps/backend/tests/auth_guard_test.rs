//! End-to-end exercises of the authentication middleware: bearer
//! validation, silent refresh, rotation, and the 401/403 split.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{test, web, App, HttpResponse};
use async_trait::async_trait;
use blog_backend::auth::credentials::REFRESH_COOKIE;
use blog_backend::auth::issuer::{mint_access_token, mint_refresh_token};
use blog_backend::auth::jwt::decode_claims;
use blog_backend::auth::policy::AccessPolicy;
use blog_backend::entities::users::Role;
use blog_backend::extractors::current_user::CurrentUser;
use blog_backend::middleware::auth_guard::AuthGuard;
use blog_backend::state::app_state::AppState;
use blog_backend::state::security_config::SecurityConfig;
use blog_backend::{AppError, Identity, IdentityStore};

struct StubIdentityStore {
    identities: HashMap<String, Identity>,
}

impl StubIdentityStore {
    fn with_users(users: &[(i64, Role)]) -> Self {
        let identities = users
            .iter()
            .map(|&(user_id, role)| (user_id.to_string(), Identity { user_id, role }))
            .collect();
        Self { identities }
    }
}

#[async_trait]
impl IdentityStore for StubIdentityStore {
    async fn load_identity(&self, subject: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.identities.get(subject).cloned())
    }
}

async fn whoami(current_user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": current_user.id })))
}

async fn editor_only() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Created().finish())
}

async fn public_echo() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("public"))
}

fn test_security() -> SecurityConfig {
    SecurityConfig::new(b"auth_guard_test_secret".to_vec())
}

fn test_state(security: SecurityConfig, users: &[(i64, Role)]) -> web::Data<AppState> {
    web::Data::new(AppState::with_identity_store(
        security,
        Arc::new(StubIdentityStore::with_users(users)),
    ))
}

macro_rules! guarded_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthGuard::new(Arc::new(AccessPolicy::blog_defaults())))
                .app_data($state)
                .route("/api/secure/whoami", web::get().to(whoami))
                .route("/api/posts", web::post().to(editor_only))
                .route("/api/comments", web::get().to(public_echo)),
        )
        .await
    };
}

#[actix_web::test]
async fn valid_bearer_token_reaches_protected_handler() {
    let security = test_security();
    let token = mint_access_token(7, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security, &[(7, Role::User)]));

    let req = test::TestRequest::get()
        .uri("/api/secure/whoami")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    // No refresh happened, so no credentials are rewritten.
    assert!(resp.headers().get(header::AUTHORIZATION).is_none());
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 7);
}

#[actix_web::test]
async fn missing_credentials_on_protected_route_is_401() {
    let app = guarded_app!(test_state(test_security(), &[(7, Role::User)]));

    let req = test::TestRequest::get()
        .uri("/api/secure/whoami")
        .to_request();
    let resp = test::try_call_service(&app, req).await;

    let err = resp.expect_err("request should be rejected");
    assert_eq!(err.error_response().status().as_u16(), 401);
}

#[actix_web::test]
async fn expired_access_token_is_refreshed_from_cookie() {
    let security = test_security();
    let hour_ago = SystemTime::now() - Duration::from_secs(3600);
    let expired_access = mint_access_token(7, hour_ago, &security).unwrap();
    // Fresh refresh token, nowhere near the rotation window.
    let refresh = mint_refresh_token(7, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security.clone(), &[(7, Role::User)]));

    let req = test::TestRequest::get()
        .uri("/api/secure/whoami")
        .insert_header((header::AUTHORIZATION, format!("Bearer {expired_access}")))
        .cookie(Cookie::new(REFRESH_COOKIE, refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    // The response carries a freshly minted bearer token for the same
    // subject...
    let new_bearer = resp
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .expect("rewritten Authorization header")
        .to_string();
    let claims = decode_claims(&new_bearer, &security).unwrap();
    assert_eq!(claims.user_id(), Some(7));

    // ...but the refresh cookie is left alone.
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

#[actix_web::test]
async fn refresh_token_near_expiry_is_rotated() {
    let security = test_security();
    // Minted five days ago with a seven-day lifetime: two days remain,
    // inside the three-day rotation window.
    let five_days_ago = SystemTime::now() - Duration::from_secs(5 * 24 * 3600);
    let old_refresh = mint_refresh_token(7, five_days_ago, &security).unwrap();
    let old_exp = decode_claims(&old_refresh, &security).unwrap().exp;
    let app = guarded_app!(test_state(security.clone(), &[(7, Role::User)]));

    let req = test::TestRequest::get()
        .uri("/api/secure/whoami")
        .cookie(Cookie::new(REFRESH_COOKIE, old_refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp.headers().get(header::AUTHORIZATION).is_some());

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("rotated refresh cookie")
        .to_string();
    let cookie = Cookie::parse(set_cookie).unwrap();
    assert_eq!(cookie.name(), REFRESH_COOKIE);
    assert!(cookie.http_only().unwrap_or(false));

    let new_claims = decode_claims(cookie.value(), &security).unwrap();
    assert_eq!(new_claims.user_id(), Some(7));
    assert!(new_claims.exp > old_exp);
}

#[actix_web::test]
async fn wrong_role_on_editor_route_is_403() {
    let security = test_security();
    let token = mint_access_token(7, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security, &[(7, Role::User)]));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::try_call_service(&app, req).await;

    let err = resp.expect_err("request should be rejected");
    assert_eq!(err.error_response().status().as_u16(), 403);
}

#[actix_web::test]
async fn manager_passes_editor_route() {
    let security = test_security();
    let token = mint_access_token(3, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security, &[(3, Role::Manager)]));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 201);
}

#[actix_web::test]
async fn vanished_account_is_403_not_401() {
    let security = test_security();
    // Token is cryptographically valid but the account no longer exists.
    let token = mint_access_token(99, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security, &[(7, Role::User)]));

    let req = test::TestRequest::get()
        .uri("/api/secure/whoami")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::try_call_service(&app, req).await;

    let err = resp.expect_err("request should be rejected");
    assert_eq!(err.error_response().status().as_u16(), 403);
}

#[actix_web::test]
async fn garbage_credentials_on_public_route_pass_through() {
    let app = guarded_app!(test_state(test_security(), &[]));

    let req = test::TestRequest::get()
        .uri("/api/comments")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .cookie(Cookie::new(REFRESH_COOKIE, "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn garbage_bearer_with_valid_refresh_still_authenticates() {
    let security = test_security();
    let refresh = mint_refresh_token(7, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security, &[(7, Role::User)]));

    let req = test::TestRequest::get()
        .uri("/api/secure/whoami")
        .insert_header((header::AUTHORIZATION, "Bearer mangled"))
        .cookie(Cookie::new(REFRESH_COOKIE, refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp.headers().get(header::AUTHORIZATION).is_some());
}

#[actix_web::test]
async fn valid_token_is_reusable_across_requests() {
    let security = test_security();
    let token = mint_access_token(7, SystemTime::now(), &security).unwrap();
    let app = guarded_app!(test_state(security, &[(7, Role::User)]));

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/secure/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert!(resp.headers().get(header::AUTHORIZATION).is_none());
    }
}
