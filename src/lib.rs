//! Treino API server: coaches manage athletes and training programs,
//! athletes follow the programs assigned to them.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use api::{routes::create_routes, AppState};
pub use error::ApiError;
