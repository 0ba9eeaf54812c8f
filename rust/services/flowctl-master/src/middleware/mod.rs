//! Middleware modules

pub mod auth;
pub mod request_id;

pub use auth::{auth_middleware, AuthContext};
pub use request_id::request_id_middleware;
#[allow(unused_imports)]
pub use request_id::RequestId;
