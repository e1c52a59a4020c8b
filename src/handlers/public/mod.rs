// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus every read-only listing of the marketplace.

pub mod content;
pub mod reviews;
pub mod services;
pub mod token;
pub mod users;

pub use content::{list_blogs, list_testimonials};
pub use reviews::list_reviews;
pub use services::{get_service, list_services};
pub use token::issue_token;
pub use users::{create_user, list_users};
