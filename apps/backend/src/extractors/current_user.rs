//! Request-scoped identity context, attached by `AuthGuard` and read by
//! handlers through `FromRequest`.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::Serialize;

use crate::entities::users::Role;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub role: Role,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Present only when AuthGuard resolved an identity for this route;
        // a handler asking for CurrentUser on a public route gets a 401.
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .copied()
                .ok_or_else(AppError::unauthorized),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use actix_web::HttpMessage;

    use super::*;

    #[actix_web::test]
    async fn reads_identity_from_extensions() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(CurrentUser {
            id: 9,
            role: Role::Manager,
        });

        let user = CurrentUser::extract(&req).await.unwrap();
        assert_eq!(user.id, 9);
        assert_eq!(user.role, Role::Manager);
    }

    #[actix_web::test]
    async fn missing_identity_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = CurrentUser::extract(&req).await.unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
