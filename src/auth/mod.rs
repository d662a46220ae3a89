pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod tokens;

pub use jwt::*;
pub use middleware::*;
pub use models::*;
pub use service::AuthService;
