//! Moderation endpoints, restricted to staff accounts.

pub mod routes;

pub use routes::routes;
