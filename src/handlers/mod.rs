// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token, optionally owner-scoped)

pub mod pagination;
pub mod protected;
pub mod public;
