//! Accounts: sign-up, login, profile and password management.

pub mod email;
pub mod forms;
pub mod password_reset;
pub mod routes;

pub use routes::routes;
