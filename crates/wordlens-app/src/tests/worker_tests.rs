use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use wordlens_core::WordKey;
use wordlens_provider::{
    ByteStream, HttpTransport, ProviderError, ProviderMetadata, SpeechProvider,
};
use wordlens_types::{Accent, Category, GenerationToken, TranslationRecord, TranslationSource};

use super::support::*;
use crate::pool::{
    CurrentToken, FetchResult, FetchWorker, Job, OutcomeEvent, Reply, WorkerOutcome, WorkerPool,
};
use crate::setup::{Providers, build_workers};
use crate::workers::audio::AudioSettings;
use crate::workers::{AudioWorker, TranslationWorker};

/// Fails every stream; downloads fail too unless a body is set
#[derive(Default)]
struct UnreachableSpeech {
    calls: AtomicUsize,
    download_body: Option<Vec<u8>>,
}

#[async_trait::async_trait]
impl SpeechProvider for UnreachableSpeech {
    async fn download(&self, _word: &str, _accent: Accent) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.download_body.clone().ok_or(ProviderError::Status(503))
    }

    async fn stream(&self, _word: &str, _accent: Accent) -> Result<ByteStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Status(503))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "unreachable".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

fn key(word: &str) -> WordKey {
    WordKey::new(word).unwrap()
}

async fn run_once(worker: &dyn FetchWorker, word: &str) -> Vec<FetchResult> {
    let (tx, rx) = kanal::bounded_async(8);
    let reply = Reply::new(GenerationToken::default().next(), key(word), worker.category(), tx);
    assert_eq!(reply.token().value(), 1);

    worker.run(&key(word), &reply).await;

    let mut results = vec![];
    while let Ok(Some(outcome)) = rx.try_recv() {
        if let OutcomeEvent::Result(result) = outcome.event {
            results.push(result);
        }
    }
    results
}

#[tokio::test]
async fn audio_waits_for_a_concurrent_download() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(UnreachableSpeech::default());
    let worker = AudioWorker::new(
        dir.path(),
        provider.clone(),
        AudioSettings {
            accent: Accent::Us,
            peer_wait: Duration::from_secs(2),
            poll_interval: Duration::from_millis(10),
            stream_start_chunks: 2,
        },
    );

    let final_path = worker.store().path(&key("cat"), Accent::Us);
    std::fs::write(wordlens_core::disk_cache::temp_path(&final_path), b"ID3").unwrap();

    let peer = {
        let final_path = final_path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            std::fs::write(&final_path, mp3_bytes()).unwrap();
        })
    };

    let results = run_once(&worker, "cat").await;
    peer.await.unwrap();

    match results.as_slice() {
        [FetchResult::Audio(Some(asset))] => assert_eq!(asset.file_path, final_path),
        other => panic!("unexpected results: {other:?}"),
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn audio_gives_up_when_every_route_fails() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(UnreachableSpeech::default());
    let settings = AudioSettings {
        accent: Accent::Uk,
        peer_wait: Duration::from_millis(20),
        poll_interval: Duration::from_millis(5),
        stream_start_chunks: 2,
    };
    let worker = AudioWorker::new(dir.path(), provider.clone(), settings);

    assert!(run_once(&worker, "cat").await.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert!(!worker.store().path(&key("cat"), Accent::Uk).exists());
}

#[tokio::test]
async fn error_page_download_never_touches_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let audio_dir = dir.path().join("Audio");
    let provider = Arc::new(UnreachableSpeech {
        download_body: Some(b"<html>Too Many Requests</html>".to_vec()),
        ..Default::default()
    });
    let settings = AudioSettings {
        accent: Accent::Us,
        peer_wait: Duration::from_millis(20),
        poll_interval: Duration::from_millis(5),
        stream_start_chunks: 2,
    };
    let worker = AudioWorker::new(&audio_dir, provider.clone(), settings);

    assert!(run_once(&worker, "cat").await.is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert!(!audio_dir.exists());
}

#[tokio::test]
async fn keyed_primary_translation_is_preferred() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(
        MockTransport::new()
            .on("dicservice", 200, r#"{"def":[{"tr":[{"text":"кот"},{"text":"кошка"}]}]}"#)
            .on(TRANSLATE, 200, google_translation("кот (fallback)")),
    );

    let mut config = test_config(dir.path());
    config.translator.primary_api_key = "key".to_string();
    let shared = transport.clone();
    let providers = Providers::build(&config, |_, _| Ok(shared.clone() as Arc<dyn HttpTransport>)).unwrap();

    let worker = TranslationWorker::new(dir.path(), providers.primary.clone(), providers.fallback.clone());
    let record = worker.fetch(&key("cat")).await;

    assert_eq!(record.source, TranslationSource::PrimaryProvider);
    assert_eq!(record.text, "кот, кошка");
    assert_eq!(transport.calls(TRANSLATE), 0);
    assert_eq!(transport.calls("key=key"), 1);

    let cached = worker.fetch(&key("cat")).await;
    assert_eq!(cached.source, TranslationSource::Cache);
    assert_eq!(transport.total_calls(), 1);
}

#[test]
fn optional_categories_follow_the_config() {
    let dir = tempfile::tempdir().unwrap();
    let layout = wordlens_core::CacheLayout::new(dir.path());
    let mut config = test_config(dir.path());
    let transport = Arc::new(MockTransport::new());

    let providers = Providers::build(&config, |_, _| Ok(transport.clone() as Arc<dyn HttpTransport>)).unwrap();
    let workers = build_workers(&config, &layout, &providers);
    assert!(workers.audio.is_none());
    assert!(workers.image.is_none());
    assert!(providers.images.is_empty());

    config.audio.auto_pronounce = true;
    config.images.enabled = true;
    let providers = Providers::build(&config, |_, _| Ok(transport.clone() as Arc<dyn HttpTransport>)).unwrap();
    let workers = build_workers(&config, &layout, &providers);
    assert_eq!(workers.audio.map(|w| w.category()), Some(Category::Audio));
    assert_eq!(workers.image.map(|w| w.category()), Some(Category::Image));
    assert_eq!(providers.images.len(), 2);
}

/// Holds every job until a permit is released
struct HeldWorker {
    started: AtomicUsize,
    release: Semaphore,
}

#[async_trait::async_trait]
impl FetchWorker for HeldWorker {
    fn category(&self) -> Category {
        Category::Translation
    }

    async fn run(&self, key: &WordKey, reply: &Reply) {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.release.acquire().await {
            permit.forget();
        }
        reply
            .deliver(FetchResult::Translation(TranslationRecord::new(
                key.as_str(),
                "ok",
                TranslationSource::Cache,
            )))
            .await;
    }
}

type HeldPool = (
    Arc<HeldWorker>,
    WorkerPool,
    kanal::AsyncReceiver<WorkerOutcome>,
    CurrentToken,
);

fn held_pool(queue_capacity: usize) -> HeldPool {
    let worker = Arc::new(HeldWorker {
        started: AtomicUsize::new(0),
        release: Semaphore::new(0),
    });
    let (tx, rx) = kanal::bounded_async::<WorkerOutcome>(16);
    let current = CurrentToken::default();
    let pool = WorkerPool::spawn(
        0,
        queue_capacity,
        worker.clone(),
        tx,
        current.clone(),
        CancellationToken::new(),
    );
    (worker, pool, rx, current)
}

/// `(word, finished)` for the next `count` outcomes
async fn next_outcomes(rx: &kanal::AsyncReceiver<WorkerOutcome>, count: usize) -> Vec<(String, bool)> {
    let mut events = vec![];
    for _ in 0..count {
        let outcome = rx.recv().await.unwrap();
        let finished = matches!(outcome.event, OutcomeEvent::Finished);
        events.push((outcome.key.to_string(), finished));
    }
    events
}

fn job(token: GenerationToken, word: &str) -> Job {
    Job { token, key: key(word) }
}

#[tokio::test]
async fn pool_reports_each_job_then_finishes_it() {
    let (worker, pool, rx, current) = held_pool(1);
    assert_eq!(pool.size(), 1);
    assert_eq!(pool.category(), Category::Translation);

    let token = GenerationToken::default().next();
    current.set(token);
    assert!(pool.dispatch(job(token, "cat")).queued);
    wait_until("worker busy", || worker.started.load(Ordering::SeqCst) == 1).await;

    // One job running, one queued, and the next current job does not fit
    assert!(pool.dispatch(job(token, "dog")).queued);
    let refused = pool.dispatch(job(token, "owl"));
    assert!(!refused.queued);
    assert!(refused.evicted.is_empty());

    worker.release.add_permits(2);

    assert_eq!(
        next_outcomes(&rx, 4).await,
        vec![
            ("cat".to_string(), false),
            ("cat".to_string(), true),
            ("dog".to_string(), false),
            ("dog".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn full_queue_makes_room_for_the_current_word() {
    let (worker, pool, rx, current) = held_pool(1);

    let old = GenerationToken::default().next();
    current.set(old);
    assert!(pool.dispatch(job(old, "cat")).queued);
    wait_until("worker busy", || worker.started.load(Ordering::SeqCst) == 1).await;
    assert!(pool.dispatch(job(old, "dog")).queued);

    let new = old.next();
    current.set(new);
    let dispatch = pool.dispatch(job(new, "owl"));
    assert!(dispatch.queued);
    assert_eq!(dispatch.evicted.len(), 1);
    assert_eq!(dispatch.evicted[0].key, key("dog"));

    worker.release.add_permits(2);

    assert_eq!(
        next_outcomes(&rx, 4).await,
        vec![
            ("cat".to_string(), false),
            ("cat".to_string(), true),
            ("owl".to_string(), false),
            ("owl".to_string(), true),
        ]
    );
    assert_eq!(worker.started.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn queued_job_for_an_abandoned_word_is_skipped() {
    let (worker, pool, rx, current) = held_pool(4);

    let old = GenerationToken::default().next();
    current.set(old);
    assert!(pool.dispatch(job(old, "cat")).queued);
    wait_until("worker busy", || worker.started.load(Ordering::SeqCst) == 1).await;
    assert!(pool.dispatch(job(old, "dog")).queued);

    current.set(old.next());
    worker.release.add_permits(1);

    assert_eq!(
        next_outcomes(&rx, 3).await,
        vec![
            ("cat".to_string(), false),
            ("cat".to_string(), true),
            ("dog".to_string(), true),
        ]
    );
    assert_eq!(worker.started.load(Ordering::SeqCst), 1);
}
