use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::JoinHandle,
};

use crate::foundation::error::{DarkroomError, DarkroomResult};

/// Messages from a batch job to the context that started it.
///
/// Per job: zero or more `Progress` with strictly increasing `current`, then exactly one of
/// `Complete` or `Error`, then nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum JobEvent<T> {
    Progress { current: usize, total: usize },
    Complete(T),
    Error { reason: String },
}

impl<T> JobEvent<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Worker-side view of a job: progress reporting and the abandon flag.
///
/// Terminal events are sent by [`spawn_job`] from the work closure's result, so a job cannot emit
/// two of them.
#[derive(Debug)]
pub struct JobReporter<T> {
    tx: mpsc::Sender<JobEvent<T>>,
    total: usize,
    last: usize,
    abandoned: Arc<AtomicBool>,
}

impl<T> JobReporter<T> {
    pub fn total(&self) -> usize {
        self.total
    }

    /// Report `current` of `total` done. Out-of-order or out-of-range values are dropped.
    pub fn progress(&mut self, current: usize) {
        if current <= self.last || current > self.total {
            tracing::warn!(current, last = self.last, total = self.total, "dropping out-of-order progress");
            return;
        }
        self.last = current;
        // A closed receiver means the job was abandoned; the flag tells the loop to stop.
        let _ = self.tx.send(JobEvent::Progress {
            current,
            total: self.total,
        });
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Relaxed)
    }
}

/// Run `work` on a dedicated thread, delivering its events over a channel.
///
/// `Ok` becomes `Complete`, `Err` becomes `Error` with the error's display text (the bare
/// message for `JobFatal`).
pub fn spawn_job<T, F>(name: &str, total: usize, work: F) -> DarkroomResult<JobHandle<T>>
where
    T: Send + 'static,
    F: FnOnce(&mut JobReporter<T>) -> DarkroomResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let abandoned = Arc::new(AtomicBool::new(false));
    let mut reporter = JobReporter {
        tx,
        total,
        last: 0,
        abandoned: abandoned.clone(),
    };
    let job_name = name.to_string();

    let worker = std::thread::Builder::new()
        .name(format!("darkroom-{name}"))
        .spawn(move || {
            let span = tracing::info_span!("job", name = %job_name, total);
            let _enter = span.enter();
            let event = match work(&mut reporter) {
                Ok(value) => JobEvent::Complete(value),
                Err(err) => {
                    tracing::error!(error = %err, "job failed");
                    let reason = match err {
                        DarkroomError::JobFatal(msg) => msg,
                        other => other.to_string(),
                    };
                    JobEvent::Error { reason }
                }
            };
            let _ = reporter.tx.send(event);
        })
        .map_err(|e| DarkroomError::job_fatal(format!("spawn worker thread: {e}")))?;

    Ok(JobHandle {
        rx,
        worker: Some(worker),
        abandoned,
        finished: false,
    })
}

/// Initiator-side handle. Job state is only ever observed through its events.
#[derive(Debug)]
pub struct JobHandle<T> {
    rx: mpsc::Receiver<JobEvent<T>>,
    worker: Option<JoinHandle<()>>,
    abandoned: Arc<AtomicBool>,
    finished: bool,
}

impl<T> JobHandle<T> {
    /// Block for the next event. Returns `None` once the terminal event has been delivered.
    ///
    /// A worker that dies without a terminal event yields a synthesized `Error`.
    pub fn recv(&mut self) -> Option<JobEvent<T>> {
        if self.finished {
            return None;
        }
        let event = self.rx.recv().unwrap_or_else(|_| JobEvent::Error {
            reason: "worker exited without a result".to_string(),
        });
        self.observe(event)
    }

    /// Non-blocking variant of [`JobHandle::recv`] for event-loop polling.
    pub fn try_recv(&mut self) -> Option<JobEvent<T>> {
        if self.finished {
            return None;
        }
        let event = match self.rx.try_recv() {
            Ok(event) => event,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => JobEvent::Error {
                reason: "worker exited without a result".to_string(),
            },
        };
        self.observe(event)
    }

    fn observe(&mut self, event: JobEvent<T>) -> Option<JobEvent<T>> {
        if event.is_terminal() {
            self.finished = true;
            if let Some(worker) = self.worker.take()
                && worker.join().is_err()
            {
                tracing::error!("job worker panicked");
            }
        }
        Some(event)
    }

    /// Drain events until the job ends, forwarding progress to `on_progress`.
    pub fn wait(mut self, mut on_progress: impl FnMut(usize, usize)) -> DarkroomResult<T> {
        while let Some(event) = self.recv() {
            match event {
                JobEvent::Progress { current, total } => on_progress(current, total),
                JobEvent::Complete(value) => return Ok(value),
                JobEvent::Error { reason } => return Err(DarkroomError::JobFatal(reason)),
            }
        }
        Err(DarkroomError::job_fatal("job already finished"))
    }

    /// Stop caring about this job. The worker stops at the next asset boundary and its output is
    /// dropped unseen.
    pub fn abandon(self) {
        self.abandoned.store(true, Ordering::Relaxed);
        tracing::info!("job abandoned");
    }
}

impl<T> Iterator for JobHandle<T> {
    type Item = JobEvent<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/job.rs"]
mod tests;
