//! Export job model: wire types and the merged client-side view.

use serde::{Deserialize, Serialize};

use ps_core::config::clamp_years;

use crate::error::{ExportError, ExportResult};

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[serde(alias = "queued")]
    Starting,
    Running,
    Done,
    Failed,
    Stopped,
}

impl JobStatus {
    /// No transition follows a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed | JobStatus::Stopped)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartExportRequest {
    pub symbols: Vec<String>,
    pub years: u32,
}

impl StartExportRequest {
    /// Normalise symbols (trimmed, upper-case, first occurrence wins) and
    /// clamp `years` into the accepted range.
    pub fn new<I, S>(symbols: I, years: u32) -> ExportResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !normalized.contains(&symbol) {
                normalized.push(symbol);
            }
        }
        if normalized.is_empty() {
            return Err(ExportError::InvalidRequest("symbol list is empty".into()));
        }
        Ok(Self {
            symbols: normalized,
            years: clamp_years(years),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartExportResponse {
    pub job_id: JobId,
}

/// One status response from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(default)]
    pub done: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub fail_reason: Option<String>,
}

impl JobSnapshot {
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status,
            done: 0,
            total: 0,
            percent: 0.0,
            current: None,
            errors: 0,
            filename: None,
            fail_reason: None,
        }
    }
}

/// Client-side state of the current export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    /// `None` until the start request has been answered.
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub done_count: u64,
    pub total_count: u64,
    pub percent: f64,
    pub current_symbol: Option<String>,
    pub error_count: u64,
    pub filename: Option<String>,
    pub fail_reason: Option<String>,
}

impl ExportJob {
    pub fn starting() -> Self {
        Self {
            job_id: None,
            status: JobStatus::Starting,
            done_count: 0,
            total_count: 0,
            percent: 0.0,
            current_symbol: None,
            error_count: 0,
            filename: None,
            fail_reason: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn mark_running(&mut self, job_id: JobId) {
        self.job_id = Some(job_id);
        self.status = JobStatus::Running;
    }

    /// Replace every reported field with the snapshot's (last write wins).
    pub(crate) fn merge(&mut self, snapshot: JobSnapshot) {
        self.status = snapshot.status;
        self.done_count = snapshot.done;
        self.total_count = snapshot.total;
        self.percent = snapshot.percent;
        self.current_symbol = snapshot.current;
        self.error_count = snapshot.errors;
        self.filename = snapshot.filename;
        self.fail_reason = snapshot.fail_reason;
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.status = JobStatus::Failed;
        self.fail_reason = Some(reason);
    }

    /// Fraction for a progress bar, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.total_count == 0 {
            return 0.0;
        }
        (self.done_count as f32 / self.total_count as f32).clamp(0.0, 1.0)
    }

    /// `12/40 (30.0%) - current: ETH - errors: 1`
    pub fn summary(&self) -> String {
        format!(
            "{}/{} ({:.1}%) - current: {} - errors: {}",
            self.done_count,
            self.total_count,
            self.percent,
            self.current_symbol.as_deref().unwrap_or("-"),
            self.error_count
        )
    }
}
