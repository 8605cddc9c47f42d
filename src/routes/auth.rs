use crate::{
    auth::{AuthenticatedIdentity, CredentialStore, LoginRequest, RegisterRequest, TokenResponse, TokenService},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns its public view. The first account
/// registered becomes an admin.
#[post("/register")]
pub async fn register(
    store: web::Data<CredentialStore>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest { username, password } = register_data.into_inner();

    // bcrypt is CPU-bound; keep it off the async worker.
    let user =
        tokio::task::spawn_blocking(move || store.register(&username, &password)).await??;

    Ok(HttpResponse::Created().json(user.view()))
}

/// Login user
///
/// Checks the credentials and returns a bearer token.
#[post("/login")]
pub async fn login(
    store: web::Data<CredentialStore>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { username, password } = login_data.into_inner();

    let user =
        tokio::task::spawn_blocking(move || store.authenticate(&username, &password)).await??;
    let token = tokens.issue(&user)?;
    log::info!("user {} (id={}) logged in", user.username, user.id);

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Returns the caller's own account.
pub async fn me(
    identity: AuthenticatedIdentity,
    store: web::Data<CredentialStore>,
) -> Result<impl Responder, AppError> {
    let user = store.get_by_id(identity.user_id)?;
    Ok(HttpResponse::Ok().json(user.view()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningSecret;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[actix_rt::test]
    async fn test_register_validation() {
        let store = web::Data::new(CredentialStore::with_cost(4).unwrap());
        let app = test::init_service(
            actix_web::App::new()
                .app_data(store.clone())
                .service(register),
        )
        .await;

        for payload in [
            json!({ "username": "bad name", "password": "pw" }),
            json!({ "username": "", "password": "pw" }),
            json!({ "username": "alice", "password": "" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/register")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", payload);
        }

        assert!(store.is_empty());
    }

    #[actix_rt::test]
    async fn test_login_returns_token() {
        let store = web::Data::new(CredentialStore::with_cost(4).unwrap());
        let tokens = web::Data::new(TokenService::new(
            &SigningSecret::new("route-test-secret"),
            chrono::Duration::hours(1),
        ));
        let alice = store.register("alice", "pw1").unwrap();

        let app = test::init_service(
            actix_web::App::new()
                .app_data(store.clone())
                .app_data(tokens.clone())
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "username": "alice", "password": "pw1" }))
            .to_request();
        let body: TokenResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tokens.verify(&body.token).unwrap().sub, alice.id);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "username": "alice", "password": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
