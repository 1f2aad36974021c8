//! ps-export: client-side lifecycle of a server export job.
//!
//! The [`ExportController`] starts a job through an [`ExportBackend`], polls
//! its status on a fixed interval from a worker thread, and merges every
//! snapshot into the [`ExportJob`] it exposes to the UI. Polling ends on a
//! terminal status, on the first failed poll, or on teardown.

pub mod backend;
pub mod controller;
pub mod error;
pub mod job;
mod poller;

pub use backend::ExportBackend;
pub use controller::ExportController;
pub use error::{ExportError, ExportResult};
pub use job::{ExportJob, JobId, JobSnapshot, JobStatus, StartExportRequest, StartExportResponse};
