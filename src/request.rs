//! Single-flight background requests polled from the UI thread.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::warn;

use crate::error::{PricingError, Result};

#[derive(Debug)]
pub enum RequestStatus<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(PricingError),
}

/// Runs at most one job at a time on the rayon pool.
#[derive(Debug)]
pub struct RequestSlot<T> {
    inflight: Option<Receiver<Result<T>>>,
    label: &'static str,
    lost: fn(String) -> PricingError,
}

impl<T: Send + 'static> RequestSlot<T> {
    /// `lost` builds the error reported when a worker dies without answering.
    pub fn new(label: &'static str, lost: fn(String) -> PricingError) -> Self {
        Self {
            inflight: None,
            label,
            lost,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inflight.is_some()
    }

    /// Starts `job` unless one is already running. Returns whether it started.
    pub fn start<F>(&mut self, job: F) -> bool
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        if self.inflight.is_some() {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        rayon::spawn(move || {
            // The receiver may be gone if the app closed meanwhile.
            let _ = tx.send(job());
        });
        self.inflight = Some(rx);
        true
    }

    /// Takes the result if the job has finished. The slot is free again
    /// after any terminal status.
    pub fn poll(&mut self) -> RequestStatus<T> {
        let Some(rx) = &self.inflight else {
            return RequestStatus::Idle;
        };
        let status = match rx.try_recv() {
            Err(TryRecvError::Empty) => return RequestStatus::Pending,
            Ok(Ok(value)) => RequestStatus::Succeeded(value),
            Ok(Err(e)) => RequestStatus::Failed(e),
            Err(TryRecvError::Disconnected) => {
                warn!(label = self.label, "request worker exited without a result");
                RequestStatus::Failed((self.lost)(format!("{} worker exited", self.label)))
            }
        };
        self.inflight = None;
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait<T: Send + 'static>(slot: &mut RequestSlot<T>) -> RequestStatus<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match slot.poll() {
                RequestStatus::Pending if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5))
                }
                other => return other,
            }
        }
    }

    #[test]
    fn idle_until_started() {
        let mut slot: RequestSlot<u32> = RequestSlot::new("test", PricingError::EstimationUnavailable);
        assert!(matches!(slot.poll(), RequestStatus::Idle));
    }

    #[test]
    fn second_start_while_pending_is_ignored() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut slot = RequestSlot::new("test", PricingError::EstimationUnavailable);

        assert!(slot.start(move || {
            let _ = gate_rx.recv();
            Ok(1)
        }));
        assert!(!slot.start(|| Ok(2)));
        assert!(matches!(slot.poll(), RequestStatus::Pending));

        gate_tx.send(()).unwrap();
        assert!(matches!(wait(&mut slot), RequestStatus::Succeeded(1)));
        assert!(!slot.is_pending());
    }

    #[test]
    fn failure_clears_the_slot() {
        let mut slot: RequestSlot<u32> = RequestSlot::new("test", PricingError::EstimationUnavailable);
        slot.start(|| Err(PricingError::EstimationUnavailable("offline".into())));

        assert!(matches!(wait(&mut slot), RequestStatus::Failed(_)));
        assert!(slot.start(|| Ok(3)));
        assert!(matches!(wait(&mut slot), RequestStatus::Succeeded(3)));
    }
}
