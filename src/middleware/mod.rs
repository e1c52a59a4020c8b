pub mod auth;
pub mod ownership;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use ownership::{authorize_owner, Owner};
