use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::{Role, User};

/// The caller's identity, resolved by `AuthMiddleware` and stored in the request
/// extensions for the lifetime of the request.
///
/// Handlers on routes wrapped by `AuthMiddleware` take this as an argument.
/// If it is missing (middleware not applied), extraction fails with
/// `AppError::MissingCredential`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl From<&User> for AuthenticatedIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

impl FromRequest for AuthenticatedIdentity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedIdentity>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => ready(Err(AppError::MissingCredential.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_identity_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthenticatedIdentity {
            user_id: 123,
            username: "alice".into(),
            role: Role::Admin,
        });

        let mut payload = Payload::None;
        let identity = AuthenticatedIdentity::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(identity.user_id, 123);
        assert_eq!(identity.role, Role::Admin);
    }

    #[actix_rt::test]
    async fn test_identity_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedIdentity::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
