//! Application wiring: services, routes, and error mapping.

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use routes::build_app;
pub use services::AppServices;
