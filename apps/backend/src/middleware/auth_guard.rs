//! Authentication middleware.
//!
//! Runs once per request, outermost of the auth-aware layers:
//! consults the route policy, validates the access token, transparently
//! refreshes expired credentials from the refresh cookie, and attaches the
//! resolved identity to request extensions for downstream extractors.
//!
//! Terminal outcomes are passthrough (possibly with rewritten
//! credentials), 401 (no usable credential for a protected route), or 403
//! (resolved identity, insufficient role / vanished account).

use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, warn};

use crate::auth::credentials::{bearer_token, build_refresh_cookie, refresh_cookie};
use crate::auth::issuer::{mint_access_token, mint_refresh_token, should_rotate};
use crate::auth::jwt::{decode_claims, TokenError};
use crate::auth::policy::{Access, AccessPolicy};
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::state::app_state::AppState;

/// Credentials minted during the refresh path, applied to the response
/// headers once the downstream handler has produced it.
struct Reissued {
    access_token: String,
    refresh_token: Option<String>,
}

pub struct AuthGuard {
    policy: Arc<AccessPolicy>,
}

impl AuthGuard {
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardMiddleware {
            service: Rc::new(service),
            policy: Arc::clone(&self.policy),
        }))
    }
}

pub struct AuthGuardMiddleware<S> {
    service: Rc<S>,
    policy: Arc<AccessPolicy>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = Arc::clone(&self.policy);

        Box::pin(async move {
            let access = policy.access_for(req.method(), req.path());

            // Public routes skip credential extraction entirely; a garbage
            // Authorization header on a public route is nobody's problem.
            if access == Access::Public {
                return service.call(req).await;
            }

            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| Error::from(AppError::internal("AppState not available")))?;
            let security = &state.security;

            let mut subject: Option<String> = None;
            let mut reissued: Option<Reissued> = None;

            // Access-token path. Expired or unverifiable tokens are not a
            // hard failure here; the refresh path below gets its chance.
            if let Some(token) = bearer_token(req.request()) {
                match decode_claims(&token, security) {
                    Ok(claims) => subject = Some(claims.sub),
                    Err(TokenError::Expired) => {
                        debug!(path = %req.path(), "access token expired, trying refresh cookie");
                    }
                    Err(err) => {
                        warn!(path = %req.path(), error = %err, "unusable access token, trying refresh cookie");
                    }
                }
            }

            // Refresh-token path: always mint a fresh access token, and
            // re-cookie the refresh token only when it is close to expiry.
            if subject.is_none() {
                if let Some(refresh) = refresh_cookie(req.request()) {
                    match decode_claims(&refresh, security) {
                        Ok(claims) => {
                            let now = SystemTime::now();
                            let user_id = claims.user_id().ok_or_else(|| {
                                Error::from(AppError::unauthorized())
                            })?;
                            let access_token = mint_access_token(user_id, now, security)?;
                            let refresh_token = if should_rotate(&refresh, now, security) {
                                debug!(path = %req.path(), "refresh token near expiry, rotating");
                                Some(mint_refresh_token(user_id, now, security)?)
                            } else {
                                None
                            };
                            reissued = Some(Reissued {
                                access_token,
                                refresh_token,
                            });
                            subject = Some(claims.sub);
                        }
                        Err(err) => {
                            debug!(path = %req.path(), error = %err, "refresh token unusable");
                        }
                    }
                }
            }

            // Protected route and nothing usable: authentication failure.
            let Some(subject) = subject else {
                return Err(AppError::unauthorized().into());
            };

            // The subject must still resolve to a live account.
            let identity = state
                .identity
                .load_identity(&subject)
                .await?
                .ok_or_else(|| Error::from(AppError::forbidden_user_not_found()))?;

            if let Access::Roles(required) = access {
                if !required.contains(&identity.role) {
                    return Err(AppError::insufficient_role().into());
                }
            }

            // Request-scoped identity context; dropped with the request.
            req.extensions_mut().insert(CurrentUser {
                id: identity.user_id,
                role: identity.role,
            });

            let mut res = service.call(req).await?;

            if let Some(reissued) = reissued {
                let bearer = format!("Bearer {}", reissued.access_token);
                if let Ok(value) = header::HeaderValue::from_str(&bearer) {
                    res.headers_mut().insert(header::AUTHORIZATION, value);
                }
                if let Some(token) = reissued.refresh_token {
                    let cookie = build_refresh_cookie(token, &state.security);
                    if let Ok(value) = header::HeaderValue::from_str(&cookie.to_string()) {
                        res.headers_mut().append(header::SET_COOKIE, value);
                    }
                }
            }

            Ok(res)
        })
    }
}
