use crate::image::{ImageF32, RasterF32};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub type ScoreResult = std::result::Result<Vec<ImageF32>, String>;

/// Segmentation capability supplied by the caller.
///
/// Receives a batch of `patch_size × patch_size × C` patches and must return
/// one `patch_size × patch_size` probability image per patch, in order, with
/// values in `[0, 1]`. Implementations should be deterministic so that block
/// identifiers stay stable across runs.
pub trait PatchScorer: Send + Sync {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult;
}

impl<S: PatchScorer + ?Sized> PatchScorer for Arc<S> {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        (**self).score_batch(patches)
    }
}

impl<S: PatchScorer + ?Sized> PatchScorer for Box<S> {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        (**self).score_batch(patches)
    }
}

/// Adapts a per-patch closure into a [`PatchScorer`].
pub struct FnScorer<F> {
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&RasterF32) -> std::result::Result<ImageF32, String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> PatchScorer for FnScorer<F>
where
    F: Fn(&RasterF32) -> std::result::Result<ImageF32, String> + Send + Sync,
{
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        patches.iter().map(|p| (self.f)(p)).collect()
    }
}

type Job = (Vec<RasterF32>, mpsc::Sender<ScoreResult>);

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map(|msg| format!("scorer panicked: {msg}"))
        .unwrap_or_else(|| "scorer panicked".to_string())
}

/// Runs batches on a fixed pool of long-lived worker threads and waits at most
/// `timeout` per batch (queueing included).
///
/// A panic inside the wrapped scorer or an expired timeout is reported as an
/// ordinary scoring failure, so the orchestrator never unwinds through model
/// code. A timed-out worker is abandoned, not killed: it leaves the pool once
/// its batch returns and a replacement is spawned on the next call.
pub struct IsolatedScorer<S> {
    inner: Arc<S>,
    timeout: Duration,
    pool_size: usize,
    jobs: Mutex<mpsc::Sender<Job>>,
    queue: Arc<Mutex<mpsc::Receiver<Job>>>,
    /// Workers that will pick up further jobs
    live: Mutex<usize>,
}

impl<S: PatchScorer + 'static> IsolatedScorer<S> {
    /// Pool sized to the available hardware parallelism.
    pub fn new(inner: Arc<S>, timeout: Duration) -> Self {
        let workers = thread::available_parallelism().map_or(1, |n| n.get());
        Self::with_workers(inner, timeout, workers)
    }

    /// Workers are spawned lazily on the first call.
    pub fn with_workers(inner: Arc<S>, timeout: Duration, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            inner,
            timeout,
            pool_size: workers.max(1),
            jobs: Mutex::new(tx),
            queue: Arc::new(Mutex::new(rx)),
            live: Mutex::new(0),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    fn ensure_workers(&self) -> std::result::Result<(), String> {
        let mut live = self
            .live
            .lock()
            .map_err(|_| "scorer pool lock poisoned".to_string())?;
        while *live < self.pool_size {
            self.spawn_worker()
                .map_err(|e| format!("failed to spawn scorer worker: {e}"))?;
            *live += 1;
        }
        Ok(())
    }

    fn spawn_worker(&self) -> std::io::Result<()> {
        let inner = Arc::clone(&self.inner);
        let queue = Arc::clone(&self.queue);
        thread::Builder::new()
            .name("patch-scorer".to_string())
            .spawn(move || loop {
                let job = match queue.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => break,
                };
                let Ok((patches, reply)) = job else {
                    break;
                };
                let result = panic::catch_unwind(AssertUnwindSafe(|| inner.score_batch(&patches)))
                    .unwrap_or_else(|payload| Err(panic_reason(payload)));
                // Caller gave up on this batch; its slot was already released.
                if reply.send(result).is_err() {
                    break;
                }
            })?;
        Ok(())
    }

    fn release_worker(&self) {
        if let Ok(mut live) = self.live.lock() {
            *live = live.saturating_sub(1);
        }
    }
}

impl<S: PatchScorer + 'static> PatchScorer for IsolatedScorer<S> {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        self.ensure_workers()?;
        let (tx, rx) = mpsc::channel();
        self.jobs
            .lock()
            .map_err(|_| "scorer queue lock poisoned".to_string())?
            .send((patches.to_vec(), tx))
            .map_err(|_| "scorer pool is shut down".to_string())?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                self.release_worker();
                Err(format!(
                    "scorer did not answer within {} ms",
                    self.timeout.as_millis()
                ))
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.release_worker();
                Err("scorer worker terminated without a result".to_string())
            }
        }
    }
}
