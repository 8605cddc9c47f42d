#![doc = "The `tasktrack` library crate."]
#![doc = ""]
#![doc = "Credential store, token service, access-control middleware, task store, routing"]
#![doc = "and error handling for the tasktrack service. The binary (`main.rs`) builds an"]
#![doc = "[`AppState`] from [`config::Config`] and mounts [`routes::config`] under `/api`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod task_store;

use actix_web::web;

use crate::auth::{CredentialStore, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::task_store::TaskStore;

/// Shared services, constructed once at startup and handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: web::Data<CredentialStore>,
    pub tokens: web::Data<TokenService>,
    pub tasks: web::Data<TaskStore>,
}

impl AppState {
    pub fn new(store: CredentialStore, tokens: TokenService, tasks: TaskStore) -> Self {
        Self {
            store: web::Data::new(store),
            tokens: web::Data::new(tokens),
            tasks: web::Data::new(tasks),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            CredentialStore::new()?,
            TokenService::new(&config.jwt_secret, config.token_ttl),
            TaskStore::new(),
        ))
    }

    /// Registers the shared services as app data.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.tokens.clone())
            .app_data(self.tasks.clone());
    }
}
