use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use ps_api::ApiResult;

/// One blocking request on a background thread.
///
/// Dropping the worker discards the result; the request itself runs to
/// completion or timeout.
pub struct FetchWorker<T> {
    result_rx: Receiver<Result<T, String>>,
    _handle: JoinHandle<()>,
}

impl<T: Send + 'static> FetchWorker<T> {
    pub fn start<F>(request: F) -> Self
    where
        F: FnOnce() -> ApiResult<T> + Send + 'static,
    {
        let (tx, rx) = channel();
        let handle = thread::spawn(move || {
            let result = request().map_err(|e| e.to_string());
            if let Err(e) = &result {
                tracing::warn!(error = %e, "background request failed");
            }
            let _ = tx.send(result);
        });

        Self {
            result_rx: rx,
            _handle: handle,
        }
    }

    /// `Some` once the request has finished.
    pub fn try_take(&self) -> Option<Result<T, String>> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err("Worker exited without a result".into())),
        }
    }
}

/// Take a finished result out of an optional worker slot.
pub fn poll_slot<T: Send + 'static>(slot: &mut Option<FetchWorker<T>>) -> Option<Result<T, String>> {
    let result = slot.as_ref()?.try_take()?;
    *slot = None;
    Some(result)
}
