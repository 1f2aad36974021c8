//! Poll worker: one background thread per export job.
//!
//! The worker issues the start request, then one status request per interval
//! until the job reaches a terminal status, a request fails, or the owning
//! [`PollHandle`] is dropped. Requests are strictly sequential.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::backend::ExportBackend;
use crate::error::ExportResult;
use crate::job::{JobId, JobSnapshot, StartExportRequest};

#[derive(Debug, Clone)]
pub(crate) enum PollEvent {
    Started { job_id: JobId },
    StartFailed { reason: String },
    Snapshot(JobSnapshot),
    PollFailed { reason: String },
    StopRequested,
    StopFailed { reason: String },
}

/// Owner side of a poll worker. Dropping it cancels the worker.
pub(crate) struct PollHandle {
    cancel_tx: Option<Sender<()>>,
    events_tx: Sender<PollEvent>,
    events_rx: Receiver<PollEvent>,
    worker: JoinHandle<()>,
}

impl PollHandle {
    pub(crate) fn spawn(
        backend: Arc<dyn ExportBackend>,
        request: StartExportRequest,
        interval: Duration,
    ) -> ExportResult<Self> {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let (events_tx, events_rx) = mpsc::channel();
        let tx = events_tx.clone();

        let worker = thread::Builder::new()
            .name("export-poll".into())
            .spawn(move || run_worker(backend.as_ref(), &request, interval, &cancel_rx, &tx))?;

        Ok(Self {
            cancel_tx: Some(cancel_tx),
            events_tx,
            events_rx,
            worker,
        })
    }

    /// Sender for one-shot side requests (stop) to report back on.
    pub(crate) fn event_sender(&self) -> Sender<PollEvent> {
        self.events_tx.clone()
    }

    pub(crate) fn try_next(&self) -> Option<PollEvent> {
        self.events_rx.try_recv().ok()
    }

    pub(crate) fn next_timeout(&self, timeout: Duration) -> Option<PollEvent> {
        self.events_rx.recv_timeout(timeout).ok()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    pub(crate) fn cancel(&mut self) {
        self.cancel_tx.take();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn cancelled(cancel_rx: &Receiver<()>) -> bool {
    !matches!(cancel_rx.try_recv(), Err(TryRecvError::Empty))
}

fn run_worker(
    backend: &dyn ExportBackend,
    request: &StartExportRequest,
    interval: Duration,
    cancel_rx: &Receiver<()>,
    tx: &Sender<PollEvent>,
) {
    let job_id = match backend.start_export(request) {
        Ok(job_id) => job_id,
        Err(e) => {
            tracing::warn!(error = %e, "export start failed");
            let _ = tx.send(PollEvent::StartFailed {
                reason: e.to_string(),
            });
            return;
        }
    };
    tracing::info!(%job_id, symbols = request.symbols.len(), "export started");
    if tx
        .send(PollEvent::Started {
            job_id: job_id.clone(),
        })
        .is_err()
    {
        return;
    }

    loop {
        // Doubles as the tick timer: anything but a timeout means cancel.
        match cancel_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!(%job_id, "export polling cancelled");
                return;
            }
        }

        let result = backend.job_status(&job_id);
        if cancelled(cancel_rx) {
            tracing::debug!(%job_id, "export polling cancelled during request");
            return;
        }

        match result {
            Ok(snapshot) => {
                let terminal = snapshot.status.is_terminal();
                tracing::debug!(%job_id, status = snapshot.status.label(), done = snapshot.done, total = snapshot.total, "export status");
                if tx.send(PollEvent::Snapshot(snapshot)).is_err() || terminal {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(%job_id, error = %e, "export status poll failed");
                let _ = tx.send(PollEvent::PollFailed {
                    reason: e.to_string(),
                });
                return;
            }
        }
    }
}
