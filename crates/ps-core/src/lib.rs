//! ps-core: shared foundation for pricescope.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - series (the price dataset that drives the chart)
//! - config (dashboard configuration: YAML file + environment overrides)
//! - error (shared error types)

pub mod config;
pub mod error;
pub mod numeric;
pub mod series;

pub use config::DashboardConfig;
pub use error::{PsError, PsResult};
pub use numeric::*;
pub use series::PriceSeries;
