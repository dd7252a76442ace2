//! Business logic between the HTTP handlers and the repositories.

pub mod auth;
pub mod tasks;

use std::sync::Arc;

use actix_web::web;
use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::JwtSettings;
use crate::db::{PgTaskRepository, PgUserRepository, TaskRepository, UserRepository};

pub use self::auth::AuthService;
pub use self::tasks::TaskService;

/// Application state shared by every worker.
#[derive(Clone)]
pub struct AppServices {
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskService>,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenService,
    ) -> Self {
        Self {
            auth: web::Data::new(AuthService::new(users, tokens)),
            tasks: web::Data::new(TaskService::new(tasks)),
        }
    }

    /// Services backed by the Postgres repositories.
    pub fn postgres(pool: PgPool, jwt: &JwtSettings) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool)),
            TokenService::from_settings(jwt),
        )
    }

    /// Registers the services as app data.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone()).app_data(self.tasks.clone());
    }
}
