#![doc = "The `todo_backend` library crate."]
#![doc = ""]
#![doc = "User registration, JWT authentication and per-user task management over"]
#![doc = "Postgres. The binary (`main.rs`) wires these pieces into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::services::AppServices;
