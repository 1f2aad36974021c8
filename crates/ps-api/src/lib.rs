//! ps-api: blocking HTTP client for the dashboard backend.
//!
//! Every endpoint is a plain JSON request/response. [`DashboardClient`] also
//! implements [`ps_export::ExportBackend`] so the export controller can drive
//! the real server.

pub mod client;
pub mod error;
pub mod types;

pub use client::DashboardClient;
pub use error::{ApiError, ApiResult};
pub use types::*;
