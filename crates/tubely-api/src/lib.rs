//! Tubely API Library
//!
//! HTTP handlers, the upload pipeline and application setup.

pub mod api_doc;
pub mod auth;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
