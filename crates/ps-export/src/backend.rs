use crate::error::ExportResult;
use crate::job::{JobId, JobSnapshot, StartExportRequest};

/// The three server calls the export lifecycle needs.
///
/// Calls block; the controller only ever issues them from its worker
/// threads.
pub trait ExportBackend: Send + Sync {
    fn start_export(&self, request: &StartExportRequest) -> ExportResult<JobId>;

    fn job_status(&self, job_id: &str) -> ExportResult<JobSnapshot>;

    /// Ask the server to cancel the running export. Advisory: the job
    /// reports `stopped` on a later status poll.
    fn stop_export(&self) -> ExportResult<()>;
}
