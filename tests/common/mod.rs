#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};
use tasktrack::auth::{CredentialStore, TokenService};
use tasktrack::config::SigningSecret;
use tasktrack::task_store::TaskStore;
use tasktrack::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Fresh services with a cheap bcrypt cost so tests stay fast.
pub fn test_state() -> AppState {
    AppState::new(
        CredentialStore::with_cost(4).expect("valid bcrypt cost"),
        TokenService::new(&SigningSecret::new(TEST_SECRET), chrono::Duration::hours(24)),
        TaskStore::new(),
    )
}

/// Builds the same `App` as `main.rs` around the given `AppState`.
macro_rules! init_app {
    ($state:expr) => {{
        let state = $state.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(|cfg| state.configure(cfg))
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(tasktrack::routes::health::health)
                .service(actix_web::web::scope("/api").configure(tasktrack::routes::config)),
        )
        .await
    }};
}
pub(crate) use init_app;

/// Sends a request and returns the status with the body parsed as JSON
/// (`Value::Null` for empty bodies).
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await
}

/// Registers (ignoring duplicates) and logs in, returning `(user_id, token)`.
pub async fn register_and_login<S, B>(app: &S, username: &str, password: &str) -> (i64, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, username, password).await;
    assert!(
        status == StatusCode::CREATED || status == StatusCode::BAD_REQUEST,
        "unexpected registration status {} for {}: {}",
        status,
        username,
        body
    );

    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", username, body);
    let token = body["token"]
        .as_str()
        .expect("login response has a token")
        .to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let (status, me) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    (me["id"].as_i64().expect("user id"), token)
}
