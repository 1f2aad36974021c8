//! Export job controller.
//!
//! Owned by a single thread (the UI). All network calls happen on worker
//! threads; their results are applied here, in order, by [`ExportController::update`]
//! or [`ExportController::wait_for_update`].

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ps_core::DashboardConfig;

use crate::backend::ExportBackend;
use crate::error::{ExportError, ExportResult};
use crate::job::{ExportJob, StartExportRequest};
use crate::poller::{PollEvent, PollHandle};

pub struct ExportController {
    backend: Arc<dyn ExportBackend>,
    poll_interval: Duration,
    job: Option<ExportJob>,
    poller: Option<PollHandle>,
    stop_requested: bool,
    last_error: Option<String>,
}

impl ExportController {
    pub fn new(backend: Arc<dyn ExportBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            job: None,
            poller: None,
            stop_requested: false,
            last_error: None,
        }
    }

    pub fn from_config(backend: Arc<dyn ExportBackend>, config: &DashboardConfig) -> Self {
        Self::new(backend, config.poll_interval())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn job(&self) -> Option<&ExportJob> {
        self.job.as_ref()
    }

    /// A job exists and has not reached a terminal status.
    pub fn is_active(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.is_terminal())
    }

    /// Whether a poll worker is still attached.
    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// Whether the attached poll worker thread has exited.
    pub fn worker_finished(&self) -> bool {
        self.poller.as_ref().is_none_or(PollHandle::is_finished)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Last error that did not change the job status (a failed stop request).
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Begin a new export. Any previous finished job is discarded.
    pub fn start(&mut self, request: StartExportRequest) -> ExportResult<()> {
        if self.is_active() {
            return Err(ExportError::AlreadyRunning);
        }
        self.teardown();

        let poller = PollHandle::spawn(self.backend.clone(), request, self.poll_interval)?;
        self.job = Some(ExportJob::starting());
        self.poller = Some(poller);
        Ok(())
    }

    /// Send the cancellation request. Local state stays running until the
    /// server reports a terminal status.
    pub fn stop(&mut self) -> ExportResult<()> {
        let Some(poller) = self.poller.as_ref().filter(|_| self.is_active()) else {
            return Err(ExportError::NotRunning);
        };

        let backend = self.backend.clone();
        let tx = poller.event_sender();
        thread::Builder::new()
            .name("export-stop".into())
            .spawn(move || {
                let event = match backend.stop_export() {
                    Ok(()) => PollEvent::StopRequested,
                    Err(e) => {
                        tracing::warn!(error = %e, "export stop request failed");
                        PollEvent::StopFailed {
                            reason: e.to_string(),
                        }
                    }
                };
                if tx.send(event).is_err() {
                    tracing::warn!("stop result dropped: export job already finished");
                }
            })?;
        self.stop_requested = true;
        Ok(())
    }

    /// Apply every pending worker event without blocking. Returns whether
    /// anything changed.
    pub fn update(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.poller.as_ref().and_then(PollHandle::try_next) {
            self.apply(event);
            changed = true;
        }
        changed
    }

    /// Block up to `timeout` for the next worker event, then drain the rest.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        let first = self
            .poller
            .as_ref()
            .and_then(|poller| poller.next_timeout(timeout));
        match first {
            Some(event) => {
                self.apply(event);
                self.update();
                true
            }
            None => false,
        }
    }

    /// Cancel polling and forget the job. Nothing is applied afterwards.
    pub fn teardown(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
        self.job = None;
        self.stop_requested = false;
        self.last_error = None;
    }

    fn apply(&mut self, event: PollEvent) {
        let Some(job) = self.job.as_mut() else {
            return;
        };

        match event {
            PollEvent::Started { job_id } => job.mark_running(job_id),
            PollEvent::StartFailed { reason } => job.fail(reason),
            PollEvent::Snapshot(snapshot) => job.merge(snapshot),
            PollEvent::PollFailed { reason } => job.fail(reason),
            PollEvent::StopRequested => {
                tracing::info!("export stop acknowledged by server");
            }
            PollEvent::StopFailed { reason } => {
                self.stop_requested = false;
                self.last_error = Some(format!("Stop request failed: {reason}"));
            }
        }

        if job.is_terminal() {
            tracing::info!(
                status = job.status.label(),
                done = job.done_count,
                total = job.total_count,
                "export finished"
            );
            // Dropping the handle cancels the worker and discards anything
            // still queued.
            self.poller = None;
        }
    }
}

impl Drop for ExportController {
    fn drop(&mut self) {
        self.teardown();
    }
}
