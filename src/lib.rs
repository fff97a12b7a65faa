pub mod admin;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
