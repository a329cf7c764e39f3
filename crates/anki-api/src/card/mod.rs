pub mod cache;
pub mod forms;
pub mod routes;
pub mod view;

pub use routes::routes;
