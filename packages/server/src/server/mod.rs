// HTTP server setup (Axum + JSON routes)
pub mod app;
pub mod error;
pub mod filters;
pub mod routes;

pub use app::*;
pub use error::ApiError;
