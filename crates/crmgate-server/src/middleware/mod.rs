//! Middleware modules

pub mod auth;
pub mod request_id;

pub use auth::BearerAuthLayer;
pub use request_id::{RequestId, RequestIdLayer};
