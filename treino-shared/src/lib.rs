//! Request schemas and wire types shared by the Treino API server and its clients.
//!
//! Every request body the API accepts is declared here together with its
//! validation rules, so the server and the CLI reject the same input.

pub mod responses;
pub mod role;
pub mod schemas;
pub mod validation;

pub use responses::*;
pub use role::UserRole;
pub use schemas::*;
pub use validation::{normalize_email, validation_details};
