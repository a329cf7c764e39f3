//! HTTP API of the flashcard catalog: public browsing, card authoring,
//! accounts and moderation.

pub mod admin;
pub mod auth;
pub mod card;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod site;
pub mod state;
pub mod tracing;
pub mod user;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
