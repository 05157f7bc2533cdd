use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kanal::AsyncReceiver;
use tokio_util::sync::CancellationToken;
use wordlens_config::pools::PoolConfig;
use wordlens_core::{AudioAsset, WordKey};
use wordlens_types::{Category, GenerationToken};

use crate::player::AudioPlayer;
use crate::pool::{
    CurrentToken, FetchResult, FetchWorker, Job, OutcomeEvent, WorkerOutcome, WorkerPool,
};
use crate::sink::UiSink;

/// The per-category workers; a missing one means the category is not fetched
pub struct Workers {
    pub translation: Arc<dyn FetchWorker>,
    pub meanings: Arc<dyn FetchWorker>,
    pub audio: Option<Arc<dyn FetchWorker>>,
    pub image: Option<Arc<dyn FetchWorker>>,
}

#[derive(Default)]
pub struct DeliveryStats {
    delivered: AtomicU64,
    stale: AtomicU64,
}

impl DeliveryStats {
    /// Results passed to the sink
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Results dropped because a newer word was submitted first
    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct State {
    token: GenerationToken,
    active: Option<WordKey>,
    /// Outstanding jobs per word
    in_flight: HashMap<WordKey, usize>,
}

impl State {
    fn settle(&mut self, key: &WordKey) {
        if let Some(count) = self.in_flight.get_mut(key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(key);
            }
        }
    }
}

/// Turns typed words into concurrent lookups and lets only the results for
/// the most recent word reach the UI.
///
/// Every accepted submission mints a new [`GenerationToken`]. Jobs carry the
/// token they were dispatched with; results whose token is no longer current
/// are dropped on delivery. In-flight requests are never cancelled, but
/// queued jobs for an abandoned word are skipped or evicted.
pub struct Coordinator {
    state: Mutex<State>,
    current: CurrentToken,
    pools: Vec<WorkerPool>,
    sink: Arc<dyn UiSink>,
    player: Arc<dyn AudioPlayer>,
    stats: DeliveryStats,
}

impl Coordinator {
    /// Spawn the worker pools and the delivery task
    pub fn start(
        workers: Workers,
        pools: &PoolConfig,
        sink: Arc<dyn UiSink>,
        player: Arc<dyn AudioPlayer>,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let (outcome_tx, outcome_rx) = kanal::bounded_async(pools.queue_capacity.max(1) * 4);
        let current = CurrentToken::default();

        let mut specs = vec![
            (workers.translation, pools.translation_workers),
            (workers.meanings, pools.meanings_workers),
        ];
        if let Some(audio) = workers.audio {
            specs.push((audio, pools.audio_workers));
        }
        if let Some(image) = workers.image {
            specs.push((image, pools.image_workers));
        }

        let pools = specs
            .into_iter()
            .map(|(worker, size)| {
                WorkerPool::spawn(
                    size,
                    pools.queue_capacity,
                    worker,
                    outcome_tx.clone(),
                    current.clone(),
                    cancel.clone(),
                )
            })
            .collect();

        let coordinator = Arc::new(Self {
            state: Mutex::new(State::default()),
            current,
            pools,
            sink,
            player,
            stats: DeliveryStats::default(),
        });

        tokio::spawn(delivery_loop(coordinator.clone(), outcome_rx, cancel));
        coordinator
    }

    /// Start lookups for `word` unless it is already the active word.
    ///
    /// Returns the token the word's results will carry, or `None` when the
    /// word has no usable letters. Never waits on I/O.
    pub fn submit(&self, word: &str) -> Option<GenerationToken> {
        let Some(key) = WordKey::new(word) else {
            tracing::debug!("Ignoring '{}': no letters to look up", word);
            return None;
        };

        let mut state = self.lock();
        if state.active.as_ref() == Some(&key) {
            tracing::debug!("'{}' is already active ({})", key, state.token);
            return Some(state.token);
        }

        state.token = state.token.next();
        state.active = Some(key.clone());
        let token = state.token;
        self.current.set(token);

        self.sink.on_reset(&key);

        let mut dispatched = 0;
        for pool in &self.pools {
            let outcome = pool.dispatch(Job {
                token,
                key: key.clone(),
            });
            for job in &outcome.evicted {
                state.settle(&job.key);
            }
            if outcome.queued {
                dispatched += 1;
            }
        }
        if dispatched > 0 {
            *state.in_flight.entry(key.clone()).or_default() += dispatched;
        }

        tracing::info!("Looking up '{}' ({}, {} jobs)", key, token, dispatched);
        Some(token)
    }

    pub fn current_token(&self) -> GenerationToken {
        self.lock().token
    }

    pub fn active_word(&self) -> Option<WordKey> {
        self.lock().active.clone()
    }

    pub fn is_in_flight(&self, key: &WordKey) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    pub fn stats(&self) -> &DeliveryStats {
        &self.stats
    }

    pub fn categories(&self) -> Vec<Category> {
        self.pools.iter().map(WorkerPool::category).collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_outcome(self: &Arc<Self>, outcome: WorkerOutcome) {
        let mut state = self.lock();

        let result = match outcome.event {
            OutcomeEvent::Finished => {
                state.settle(&outcome.key);
                return;
            }
            OutcomeEvent::Result(result) => result,
        };

        if outcome.token != state.token {
            self.stats.stale.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                "Dropping stale {} result for '{}' ({} < {})",
                outcome.category,
                outcome.key,
                outcome.token,
                state.token
            );
            return;
        }

        self.stats.delivered.fetch_add(1, Ordering::Relaxed);
        let key = outcome.key;

        match result {
            FetchResult::Translation(record) => self.sink.on_translation_ready(&key, record),
            FetchResult::Meanings(record) => self.sink.on_meanings_ready(&key, record),
            FetchResult::Image(Some(path)) => self.sink.on_image_ready(&key, path),
            FetchResult::Image(None) => tracing::debug!("No image for '{}'", key),
            FetchResult::Audio(Some(asset)) => {
                drop(state);
                self.spawn_playback(outcome.token, key, asset);
            }
            FetchResult::Audio(None) => tracing::debug!("No audio for '{}'", key),
        }
    }

    fn spawn_playback(self: &Arc<Self>, token: GenerationToken, key: WordKey, asset: AudioAsset) {
        let coordinator = self.clone();

        tokio::spawn(async move {
            if let Err(e) = coordinator.player.play(&asset.file_path).await {
                tracing::warn!("Playback of '{}' failed: {:#}", key, e);
                return;
            }

            let state = coordinator.lock();
            if state.token == token {
                coordinator.sink.on_audio_played(&key, asset.accent);
            }
        });
    }
}

async fn delivery_loop(
    coordinator: Arc<Coordinator>,
    outcomes: AsyncReceiver<WorkerOutcome>,
    cancel: CancellationToken,
) {
    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = outcomes.recv() => match outcome {
                Ok(outcome) => outcome,
                Err(_) => break,
            },
        };

        coordinator.handle_outcome(outcome);
    }

    tracing::debug!("Delivery loop stopped");
}
