//! propscope HTTP gateway.
//!
//! Accepts multipart classification requests, serves the sample catalog,
//! and maps pipeline errors onto HTTP statuses.

pub mod classify;
pub mod error;
pub mod health_api;
pub mod samples_api;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState};
