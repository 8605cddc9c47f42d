//! In-memory credential store.
//!
//! The store is the single authority over user identity. It is built once at
//! startup and shared with the handlers and the authentication middleware as a
//! `web::Data<CredentialStore>` handle.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::auth::password::{hash_password, verify_password, DEFAULT_COST};
use crate::error::AppError;
use crate::models::{Role, User};

struct Users {
    by_id: HashMap<i32, User>,
    next_id: i32,
}

pub struct CredentialStore {
    users: RwLock<Users>,
    cost: u32,
    /// Hash of a throwaway password, checked when a login names an unknown user so
    /// that the response time matches a real password comparison.
    dummy_hash: String,
}

impl CredentialStore {
    /// Creates an empty store hashing at `bcrypt::DEFAULT_COST`.
    pub fn new() -> Result<Self, AppError> {
        Self::with_cost(DEFAULT_COST)
    }

    /// Creates an empty store hashing at the given bcrypt cost (4..=31).
    pub fn with_cost(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password("tasktrack-timing-equalizer", cost)?;
        Ok(Self {
            users: RwLock::new(Users {
                by_id: HashMap::new(),
                next_id: 1,
            }),
            cost,
            dummy_hash,
        })
    }

    /// Registers a new user. The first user in an empty store becomes an admin.
    pub fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        // Hash before taking the lock; bcrypt is the slow part.
        let password_hash = hash_password(password, self.cost)?;

        let mut users = self.users.write();
        if users.by_id.values().any(|u| u.username == username) {
            return Err(AppError::DuplicateUsername);
        }

        let role = if users.by_id.is_empty() {
            Role::Admin
        } else {
            Role::User
        };
        let user = User {
            id: users.next_id,
            username: username.to_string(),
            password_hash,
            role,
        };
        users.next_id += 1;
        users.by_id.insert(user.id, user.clone());

        log::info!("registered user {} (id={}, role={})", user.username, user.id, user.role);
        Ok(user)
    }

    /// Checks a username/password pair. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let candidate = self
            .users
            .read()
            .by_id
            .values()
            .find(|u| u.username == username)
            .cloned();

        match candidate {
            Some(user) => {
                if verify_password(password, &user.password_hash)? {
                    Ok(user)
                } else {
                    log::warn!("failed login for user id={}", user.id);
                    Err(AppError::InvalidCredentials)
                }
            }
            None => {
                let _ = verify_password(password, &self.dummy_hash)?;
                log::warn!("failed login for unknown username");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub fn get_by_id(&self, id: i32) -> Result<User, AppError> {
        self.users
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    /// Grants the admin role. Promoting an admin is a no-op.
    pub fn promote(&self, id: i32) -> Result<User, AppError> {
        let mut users = self.users.write();
        let user = users
            .by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;

        if user.role != Role::Admin {
            user.role = Role::Admin;
            log::info!("promoted user {} (id={}) to admin", user.username, user.id);
        }
        Ok(user.clone())
    }

    /// All users ordered by id.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().by_id.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        users
    }

    pub fn len(&self) -> usize {
        self.users.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn remove(&self, id: i32) -> Option<User> {
        self.users.write().by_id.remove(&id)
    }
}
