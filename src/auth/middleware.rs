use std::collections::HashSet;
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedIdentity;
use crate::auth::store::CredentialStore;
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::Role;

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = value.ok_or(AppError::MissingCredential)?;
    let value = value.to_str().map_err(|_| AppError::MalformedCredential)?.trim();
    if value.is_empty() {
        return Err(AppError::MissingCredential);
    }

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() || token.contains(' ') {
                Err(AppError::MalformedCredential)
            } else {
                Ok(token)
            }
        }
        _ => Err(AppError::MalformedCredential),
    }
}

/// Runs the full credential check for one request: header shape, token
/// signature and validity window, then a lookup of the user by id.
///
/// The role is taken from the store rather than the token, so a promotion
/// applies to tokens issued before it.
pub fn resolve_identity(
    authorization: Option<&HeaderValue>,
    tokens: &TokenService,
    store: &CredentialStore,
) -> Result<AuthenticatedIdentity, AppError> {
    let token = bearer_token(authorization)?;
    let claims = tokens.verify(token)?;
    let user = store
        .get_by_id(claims.sub)
        .map_err(|_| AppError::IdentityNotFound)?;
    Ok(AuthenticatedIdentity::from(&user))
}

/// Authenticates every request passing through it and stores the resulting
/// [`AuthenticatedIdentity`] in the request extensions.
///
/// Requires `web::Data<TokenService>` and `web::Data<CredentialStore>` to be
/// registered as app data. Rejected requests never reach the inner service.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match (
            req.app_data::<web::Data<TokenService>>(),
            req.app_data::<web::Data<CredentialStore>>(),
        ) {
            (Some(tokens), Some(store)) => {
                resolve_identity(req.headers().get(header::AUTHORIZATION), tokens, store)
            }
            _ => Err(AppError::InternalServerError(
                "AuthMiddleware requires TokenService and CredentialStore app data".into(),
            )),
        };

        match outcome {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                log::info!("rejected {} {}: {}", req.method(), req.path(), err);
                let response = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

/// Checks the caller's role against the set allowed for one operation.
pub fn check_role(
    identity: Option<&AuthenticatedIdentity>,
    allowed: &HashSet<Role>,
) -> Result<(), AppError> {
    match identity {
        Some(identity) if allowed.contains(&identity.role) => Ok(()),
        Some(identity) => {
            log::warn!(
                "user id={} with role {} denied; allowed roles: {:?}",
                identity.user_id,
                identity.role,
                allowed
            );
            Err(AppError::InsufficientRole)
        }
        None => Err(AppError::MissingCredential),
    }
}

/// Role gate for a single route or resource. Must sit inside `AuthMiddleware`.
///
/// ```ignore
/// web::resource("/{id}/promote")
///     .wrap(RequireRole::admin())
///     .route(web::post().to(promote_user))
/// ```
#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<HashSet<Role>>,
}

impl RequireRole {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: Rc::new(roles.into_iter().collect()),
        }
    }

    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            allowed: Rc::clone(&self.allowed),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    allowed: Rc<HashSet<Role>>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = check_role(req.extensions().get::<AuthenticatedIdentity>(), &self.allowed);

        match decision {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                let response = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
