//! User administration endpoints. Every route here is registered behind
//! `AuthMiddleware` and `RequireRole::admin()`.

use crate::{
    auth::{AuthenticatedIdentity, CredentialStore},
    error::AppError,
    models::UserView,
};
use actix_web::{web, HttpResponse, Responder};

/// Lists every registered user.
pub async fn list_users(store: web::Data<CredentialStore>) -> impl Responder {
    let users: Vec<UserView> = store.list().iter().map(UserView::from).collect();
    HttpResponse::Ok().json(users)
}

pub async fn get_user(
    store: web::Data<CredentialStore>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = store.get_by_id(user_id.into_inner())?;
    Ok(HttpResponse::Ok().json(user.view()))
}

/// Grants the admin role to the user in the path.
///
/// ## Responses:
/// - `200 OK`: the updated user. Promoting an existing admin also returns 200.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `403 Forbidden`: the caller is not an admin.
/// - `404 Not Found`: no user with that id.
pub async fn promote_user(
    identity: AuthenticatedIdentity,
    store: web::Data<CredentialStore>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = store.promote(user_id.into_inner())?;
    log::info!(
        "user {} (id={}) promoted by {} (id={})",
        user.username,
        user.id,
        identity.username,
        identity.user_id
    );
    Ok(HttpResponse::Ok().json(user.view()))
}
