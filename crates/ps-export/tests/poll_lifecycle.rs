//! Export controller lifecycle against a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use ps_export::{
    ExportBackend, ExportController, ExportError, ExportResult, JobSnapshot, JobStatus,
    StartExportRequest,
};

const TICK: Duration = Duration::from_millis(5);

/// Answers status polls from a fixed script; an exhausted script keeps
/// reporting `running`.
#[derive(Default)]
struct ScriptedBackend {
    start_error: Option<String>,
    stop_error: Option<String>,
    script: Mutex<VecDeque<Result<JobSnapshot, String>>>,
    status_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn with_script(script: Vec<Result<JobSnapshot, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        })
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

impl ExportBackend for ScriptedBackend {
    fn start_export(&self, _request: &StartExportRequest) -> ExportResult<String> {
        match &self.start_error {
            Some(message) => Err(ExportError::backend(message.clone())),
            None => Ok("job-1".to_string()),
        }
    }

    fn job_status(&self, job_id: &str) -> ExportResult<JobSnapshot> {
        assert_eq!(job_id, "job-1");
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(message)) => Err(ExportError::backend(message)),
            None => Ok(running(0, 1)),
        }
    }

    fn stop_export(&self) -> ExportResult<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        match &self.stop_error {
            Some(message) => Err(ExportError::backend(message.clone())),
            None => Ok(()),
        }
    }
}

/// Status responses that take much longer than the poll tick.
struct SlowBackend {
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ExportBackend for SlowBackend {
    fn start_export(&self, _request: &StartExportRequest) -> ExportResult<String> {
        Ok("job-1".to_string())
    }

    fn job_status(&self, _job_id: &str) -> ExportResult<JobSnapshot> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.latency);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(if call < 3 {
            running(call as u64, 3)
        } else {
            finished(JobStatus::Done)
        })
    }

    fn stop_export(&self) -> ExportResult<()> {
        Ok(())
    }
}

fn running(done: u64, total: u64) -> JobSnapshot {
    JobSnapshot {
        done,
        total,
        percent: if total == 0 {
            0.0
        } else {
            done as f64 / total as f64 * 100.0
        },
        current: Some("BTC".into()),
        ..JobSnapshot::with_status(JobStatus::Running)
    }
}

fn finished(status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        done: 2,
        total: 2,
        percent: 100.0,
        filename: Some("coinbase_daily_1y.csv".into()),
        ..JobSnapshot::with_status(status)
    }
}

fn request() -> StartExportRequest {
    StartExportRequest::new(["BTC", "ETH"], 1).unwrap()
}

/// Pump the controller until `done` holds or the deadline passes.
fn pump_until(controller: &mut ExportController, done: impl Fn(&ExportController) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(controller) {
        assert!(Instant::now() < deadline, "timed out waiting for controller");
        controller.wait_for_update(Duration::from_millis(50));
    }
}

fn status_of(controller: &ExportController) -> Option<JobStatus> {
    controller.job().map(|job| job.status)
}

#[test]
fn polling_stops_after_terminal_snapshot() {
    let backend = ScriptedBackend::with_script(vec![
        Ok(running(0, 2)),
        Ok(running(1, 2)),
        Ok(finished(JobStatus::Done)),
    ]);
    let mut controller = ExportController::new(backend.clone(), TICK);
    controller.start(request()).unwrap();
    assert_eq!(status_of(&controller), Some(JobStatus::Starting));

    pump_until(&mut controller, |c| !c.is_active());

    let job = controller.job().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.filename.as_deref(), Some("coinbase_daily_1y.csv"));
    assert_eq!(job.job_id.as_deref(), Some("job-1"));
    assert!(!controller.is_polling());

    thread::sleep(TICK * 10);
    assert_eq!(backend.status_calls(), 3);
    assert!(!controller.update());
}

#[test]
fn poll_failure_is_terminal() {
    let backend = ScriptedBackend::with_script(vec![
        Ok(running(0, 2)),
        Err("connection reset".into()),
        Ok(running(1, 2)),
    ]);
    let mut controller = ExportController::new(backend.clone(), TICK);
    controller.start(request()).unwrap();

    pump_until(&mut controller, |c| !c.is_active());

    let job = controller.job().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.fail_reason.as_deref().unwrap().contains("connection reset"));
    assert!(!controller.is_polling());

    thread::sleep(TICK * 10);
    assert_eq!(backend.status_calls(), 2);
}

#[test]
fn start_failure_never_polls() {
    let backend = Arc::new(ScriptedBackend {
        start_error: Some("symbols ist leer".into()),
        ..Default::default()
    });
    let mut controller = ExportController::new(backend.clone(), TICK);
    controller.start(request()).unwrap();

    pump_until(&mut controller, |c| !c.is_active());

    let job = controller.job().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.job_id, None);
    assert!(job.fail_reason.as_deref().unwrap().contains("symbols ist leer"));

    thread::sleep(TICK * 10);
    assert_eq!(backend.status_calls(), 0);
}

#[test]
fn stop_is_advisory_until_stopped_snapshot() {
    let backend = ScriptedBackend::with_script(vec![
        Ok(running(0, 5)),
        Ok(running(1, 5)),
        Ok(running(1, 5)),
        Ok(finished(JobStatus::Stopped)),
    ]);
    // Slow ticks keep the stop request ahead of the scripted snapshots.
    let mut controller = ExportController::new(backend.clone(), TICK * 10);
    controller.start(request()).unwrap();

    pump_until(&mut controller, |c| {
        c.job().is_some_and(|job| job.current_symbol.is_some())
    });
    controller.stop().unwrap();
    assert!(controller.stop_requested());
    assert_eq!(status_of(&controller), Some(JobStatus::Running));
    assert!(controller.is_active());

    pump_until(&mut controller, |c| !c.is_active());
    assert_eq!(status_of(&controller), Some(JobStatus::Stopped));
    assert_eq!(backend.stop_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.status_calls(), 4);
}

#[test]
fn teardown_cancels_polling() {
    let backend = ScriptedBackend::with_script(Vec::new());
    let mut controller = ExportController::new(backend.clone(), TICK);
    controller.start(request()).unwrap();

    pump_until(&mut controller, |c| status_of(c) == Some(JobStatus::Running));
    controller.teardown();
    assert!(controller.job().is_none());
    assert!(!controller.is_polling());

    // At most one request can already be in flight.
    thread::sleep(TICK * 4);
    let settled = backend.status_calls();
    thread::sleep(TICK * 10);
    assert_eq!(backend.status_calls(), settled);
    assert!(!controller.update());
}

#[test]
fn dropping_controller_cancels_polling() {
    let backend = ScriptedBackend::with_script(Vec::new());
    {
        let mut controller = ExportController::new(backend.clone(), TICK);
        controller.start(request()).unwrap();
        pump_until(&mut controller, |c| status_of(c) == Some(JobStatus::Running));
    }
    thread::sleep(TICK * 4);
    let settled = backend.status_calls();
    thread::sleep(TICK * 10);
    assert_eq!(backend.status_calls(), settled);
}

#[test]
fn second_start_rejected_while_active() {
    let backend = ScriptedBackend::with_script(Vec::new());
    let mut controller = ExportController::new(backend, TICK);
    controller.start(request()).unwrap();

    let err = controller.start(request()).unwrap_err();
    assert!(matches!(err, ExportError::AlreadyRunning));
}

#[test]
fn restart_after_finish_resets_job() {
    let backend = ScriptedBackend::with_script(vec![
        Ok(finished(JobStatus::Done)),
        Ok(running(0, 3)),
    ]);
    let mut controller = ExportController::new(backend, TICK);
    controller.start(request()).unwrap();
    pump_until(&mut controller, |c| !c.is_active());

    controller.start(request()).unwrap();
    let job = controller.job().unwrap();
    assert_eq!(job.status, JobStatus::Starting);
    assert_eq!(job.filename, None);
    pump_until(&mut controller, |c| {
        c.job().is_some_and(|job| job.total_count == 3)
    });
}

#[test]
fn stop_without_job_is_rejected() {
    let backend = ScriptedBackend::with_script(Vec::new());
    let mut controller = ExportController::new(backend.clone(), TICK);
    assert!(matches!(controller.stop(), Err(ExportError::NotRunning)));
    assert_eq!(backend.stop_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn slow_status_responses_never_overlap() {
    let backend = Arc::new(SlowBackend {
        latency: Duration::from_millis(30),
        calls: AtomicUsize::new(0),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    });
    let mut controller = ExportController::new(backend.clone(), Duration::from_millis(2));
    controller.start(request()).unwrap();

    pump_until(&mut controller, |c| !c.is_active());

    assert_eq!(status_of(&controller), Some(JobStatus::Done));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_stop_reenables_stop() {
    let backend = Arc::new(ScriptedBackend {
        stop_error: Some("upstream timeout".into()),
        ..Default::default()
    });
    let mut controller = ExportController::new(backend.clone(), TICK);
    controller.start(request()).unwrap();
    pump_until(&mut controller, |c| status_of(c) == Some(JobStatus::Running));

    controller.stop().unwrap();
    assert!(controller.stop_requested());
    pump_until(&mut controller, |c| !c.stop_requested());

    assert!(controller.last_error().unwrap().contains("upstream timeout"));
    assert_eq!(status_of(&controller), Some(JobStatus::Running));
    assert!(controller.is_active());
    assert_eq!(backend.stop_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn stop_result_after_teardown_is_discarded() {
    let backend = Arc::new(ScriptedBackend {
        stop_error: Some("upstream timeout".into()),
        ..Default::default()
    });
    let mut controller = ExportController::new(backend.clone(), TICK);
    controller.start(request()).unwrap();
    pump_until(&mut controller, |c| status_of(c) == Some(JobStatus::Running));

    controller.stop().unwrap();
    controller.teardown();

    let deadline = Instant::now() + Duration::from_secs(5);
    while backend.stop_calls.load(Ordering::SeqCst) == 0 {
        assert!(Instant::now() < deadline, "stop request never sent");
        thread::sleep(TICK);
    }
    thread::sleep(TICK * 4);
    assert!(!controller.update());
    assert!(controller.last_error().is_none());
    assert!(controller.job().is_none());
}
