pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{guard, web, HttpRequest};

use crate::auth::{AuthMiddleware, RequireRole};
use crate::error::AppError;

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

fn path_error(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

/// Registers the API routes. Expects `CredentialStore`, `TokenService` and
/// `TaskStore` to be available as `web::Data`.
///
/// Each role-gated operation is its own method-guarded resource carrying a
/// `RequireRole`; the enclosing scope's `AuthMiddleware` runs first. A method
/// with no registered resource falls through to a 404.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register)
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::me)),
                ),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(
                    web::resource("")
                        .wrap(RequireRole::admin())
                        .route(web::get().to(users::list_users)),
                )
                .service(
                    web::resource("/{id}")
                        .wrap(RequireRole::admin())
                        .route(web::get().to(users::get_user)),
                )
                .service(
                    web::resource("/{id}/promote")
                        .wrap(RequireRole::admin())
                        .route(web::post().to(users::promote_user)),
                ),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(
                    web::resource("")
                        .guard(guard::Get())
                        .route(web::get().to(tasks::list_tasks)),
                )
                .service(
                    web::resource("")
                        .guard(guard::Post())
                        .wrap(RequireRole::admin())
                        .route(web::post().to(tasks::create_task)),
                )
                .service(
                    web::resource("/{id}")
                        .guard(guard::Get())
                        .route(web::get().to(tasks::get_task)),
                )
                .service(
                    web::resource("/{id}")
                        .guard(guard::Any(guard::Put()).or(guard::Delete()))
                        .wrap(RequireRole::admin())
                        .route(web::put().to(tasks::update_task))
                        .route(web::delete().to(tasks::delete_task)),
                ),
        );
}
