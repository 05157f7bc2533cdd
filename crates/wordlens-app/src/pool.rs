use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use wordlens_core::{AudioAsset, WordKey};
use wordlens_types::{Category, GenerationToken, MeaningsRecord, TranslationRecord};

/// One lookup for one word, tagged with the token current when it was submitted
#[derive(Debug, Clone)]
pub struct Job {
    pub token: GenerationToken,
    pub key: WordKey,
}

#[derive(Debug, Clone)]
pub enum FetchResult {
    Translation(TranslationRecord),
    Meanings(MeaningsRecord),
    /// May point at a file that is still being streamed
    Audio(Option<AudioAsset>),
    Image(Option<PathBuf>),
}

#[derive(Debug)]
pub enum OutcomeEvent {
    Result(FetchResult),
    /// The worker is done with the job, whether or not it delivered anything
    Finished,
}

/// What a worker reports back to the coordinator
#[derive(Debug)]
pub struct WorkerOutcome {
    pub token: GenerationToken,
    pub key: WordKey,
    pub category: Category,
    pub event: OutcomeEvent,
}

/// Token of the active word, shared by the coordinator and its pools
#[derive(Debug, Clone, Default)]
pub struct CurrentToken(Arc<AtomicU64>);

impl CurrentToken {
    pub fn set(&self, token: GenerationToken) {
        self.0.store(token.value(), Ordering::Release);
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.0.load(Ordering::Acquire) == token.value()
    }
}

/// What happened to a dispatched job
#[derive(Debug, Default)]
pub struct Dispatch {
    pub queued: bool,
    /// Queued jobs for abandoned words, dropped to make room
    pub evicted: Vec<Job>,
}

/// Handle a worker uses to report results for its current job
#[derive(Clone)]
pub struct Reply {
    token: GenerationToken,
    key: WordKey,
    category: Category,
    tx: AsyncSender<WorkerOutcome>,
}

impl Reply {
    pub fn new(
        token: GenerationToken,
        key: WordKey,
        category: Category,
        tx: AsyncSender<WorkerOutcome>,
    ) -> Self {
        Self {
            token,
            key,
            category,
            tx,
        }
    }

    pub fn token(&self) -> GenerationToken {
        self.token
    }

    pub async fn deliver(&self, result: FetchResult) {
        self.send(OutcomeEvent::Result(result)).await;
    }

    async fn finish(&self) {
        self.send(OutcomeEvent::Finished).await;
    }

    async fn send(&self, event: OutcomeEvent) {
        let outcome = WorkerOutcome {
            token: self.token,
            key: self.key.clone(),
            category: self.category,
            event,
        };
        if let Err(e) = self.tx.send(outcome).await {
            tracing::debug!("[{}] result channel closed: {}", self.category, e);
        }
    }
}

/// Cache-then-network lookup for one category
#[async_trait::async_trait]
pub trait FetchWorker: Send + Sync {
    fn category(&self) -> Category;

    /// Deliver zero or more results through `reply`; errors are handled inside
    async fn run(&self, key: &WordKey, reply: &Reply);
}

/// Fixed number of tasks draining a bounded job queue.
///
/// Jobs whose token is no longer current are skipped by the workers and are
/// the first to go when the queue is full.
pub struct WorkerPool {
    category: Category,
    jobs: AsyncSender<Job>,
    queued: AsyncReceiver<Job>,
    current: CurrentToken,
    size: usize,
}

impl WorkerPool {
    pub fn spawn(
        size: usize,
        queue_capacity: usize,
        worker: Arc<dyn FetchWorker>,
        outcomes: AsyncSender<WorkerOutcome>,
        current: CurrentToken,
        cancel: CancellationToken,
    ) -> Self {
        let size = size.max(1);
        let category = worker.category();
        let (jobs, rx) = kanal::bounded_async(queue_capacity.max(1));

        for id in 0..size {
            tokio::spawn(worker_loop(
                id,
                worker.clone(),
                rx.clone(),
                outcomes.clone(),
                current.clone(),
                cancel.child_token(),
            ));
        }

        tracing::debug!("[{}] pool started with {} workers", category, size);
        Self {
            category,
            jobs,
            queued: rx,
            current,
            size,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue a job without waiting. A full queue first sheds jobs for
    /// abandoned words; the new job is refused only when that frees nothing.
    pub fn dispatch(&self, job: Job) -> Dispatch {
        if self.try_queue(&job) {
            return Dispatch {
                queued: true,
                evicted: vec![],
            };
        }

        let evicted = self.evict_stale();
        let queued = self.try_queue(&job);
        if !queued {
            tracing::warn!("[{}] job queue full, dropping job for '{}'", self.category, job.key);
        } else if !evicted.is_empty() {
            tracing::debug!("[{}] evicted {} stale jobs", self.category, evicted.len());
        }

        Dispatch { queued, evicted }
    }

    fn try_queue(&self, job: &Job) -> bool {
        match self.jobs.try_send(job.clone()) {
            Ok(sent) => sent,
            Err(e) => {
                tracing::error!("[{}] job queue closed: {}", self.category, e);
                false
            }
        }
    }

    fn evict_stale(&self) -> Vec<Job> {
        let mut evicted = vec![];
        let mut kept = vec![];

        while let Ok(Some(job)) = self.queued.try_recv() {
            if self.current.is_current(job.token) {
                kept.push(job);
            } else {
                evicted.push(job);
            }
        }

        for job in kept {
            if !self.try_queue(&job) {
                tracing::warn!("[{}] lost job for '{}' while evicting", self.category, job.key);
            }
        }

        evicted
    }
}

async fn worker_loop(
    id: usize,
    worker: Arc<dyn FetchWorker>,
    jobs: AsyncReceiver<Job>,
    outcomes: AsyncSender<WorkerOutcome>,
    current: CurrentToken,
    cancel: CancellationToken,
) {
    let category = worker.category();

    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = jobs.recv() => match job {
                Ok(job) => job,
                Err(_) => break,
            },
        };

        let reply = Reply::new(job.token, job.key.clone(), category, outcomes.clone());
        if current.is_current(job.token) {
            tracing::debug!("[{}#{}] {} for '{}'", category, id, job.token, job.key);
            worker.run(&job.key, &reply).await;
        } else {
            tracing::trace!("[{}#{}] skipping '{}', no longer current", category, id, job.key);
        }
        reply.finish().await;
    }

    tracing::debug!("[{}#{}] worker stopped", category, id);
}
