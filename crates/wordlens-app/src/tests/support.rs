use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use wordlens_config::Config;
use wordlens_core::{CacheLayout, WordKey};
use wordlens_provider::{HttpError, HttpRequest, HttpResponse, HttpStream, HttpTransport};
use wordlens_types::{Accent, MeaningsRecord, TranslationRecord, TranslationSource};

use crate::coordinator::Coordinator;
use crate::player::AudioPlayer;
use crate::setup::{Providers, build_workers};
use crate::sink::UiSink;

pub const TRANSLATE: &str = "translate_a";
pub const DICTIONARY: &str = "dictionaryapi";
pub const TTS: &str = "translate_tts";
pub const WIKI: &str = "wikipedia.org";

pub fn google_translation(text: &str) -> String {
    format!(r#"[[["{text}","src",null,null,1]],null,"en"]"#)
}

pub fn dictionary_entry(word: &str) -> String {
    format!(
        r#"[{{"word":"{word}","phonetics":[{{"text":"/x/"}}],"meanings":[{{"partOfSpeech":"noun","definitions":[{{"definition":"A test word."}}]}}]}}]"#
    )
}

/// Enough bytes with an ID3 header to pass the audio checks
pub fn mp3_bytes() -> Vec<u8> {
    let mut bytes = b"ID3".to_vec();
    bytes.resize(4096, 0x55);
    bytes
}

struct Route {
    pattern: String,
    status: u16,
    body: Vec<u8>,
    streaming: bool,
}

/// Answers by the first route whose pattern occurs in the request URL.
/// Unmatched requests fail like an unreachable host.
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(vec![]),
            calls: Mutex::new(vec![]),
            gate: None,
        }
    }

    /// Requests are recorded but held until `open_gate`
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn on(self, pattern: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.route(pattern, status, body.into(), false)
    }

    /// Only used for streamed requests
    pub fn on_stream(self, pattern: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.route(pattern, status, body.into(), true)
    }

    fn route(self, pattern: &str, status: u16, body: Vec<u8>, streaming: bool) -> Self {
        self.routes.lock().unwrap().push(Route {
            pattern: pattern.to_string(),
            status,
            body,
            streaming,
        });
        self
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(10_000);
        }
    }

    pub fn calls(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn answer(&self, request: &HttpRequest, streaming: bool) -> Result<(u16, Vec<u8>), HttpError> {
        let url = request.display_url();
        self.calls.lock().unwrap().push(url.clone());

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }

        let routes = self.routes.lock().unwrap();
        let pick = |want_stream: bool| {
            routes
                .iter()
                .find(|route| route.streaming == want_stream && url.contains(&route.pattern))
        };
        let route = if streaming {
            pick(true).or_else(|| pick(false))
        } else {
            pick(false)
        };

        route
            .map(|route| (route.status, route.body.clone()))
            .ok_or_else(|| HttpError::Connection(format!("no route for {url}")))
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let (status, body) = self.answer(request, false).await?;
        Ok(HttpResponse { status, body })
    }

    async fn stream(&self, request: &HttpRequest) -> Result<HttpStream, HttpError> {
        let (status, body) = self.answer(request, true).await?;
        let chunks: Vec<Result<Vec<u8>, HttpError>> =
            body.chunks(512).map(|c| Ok(c.to_vec())).collect();
        Ok(HttpStream {
            status,
            body: futures_util::stream::iter(chunks).boxed(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Reset(String),
    Translation {
        word: String,
        text: String,
        source: TranslationSource,
    },
    Meanings {
        word: String,
        parts_of_speech: Vec<String>,
    },
    AudioPlayed(String),
    Image(String, PathBuf),
}

#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn resets(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SinkCall::Reset(_)))
            .count()
    }

    pub fn translations(&self) -> Vec<(String, String, TranslationSource)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::Translation { word, text, source } => Some((word, text, source)),
                _ => None,
            })
            .collect()
    }

    pub fn has(&self, pred: impl Fn(&SinkCall) -> bool) -> bool {
        self.calls().iter().any(pred)
    }

    fn push(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl UiSink for RecordingSink {
    fn on_reset(&self, key: &WordKey) {
        self.push(SinkCall::Reset(key.to_string()));
    }

    fn on_translation_ready(&self, key: &WordKey, record: TranslationRecord) {
        self.push(SinkCall::Translation {
            word: key.to_string(),
            text: record.text,
            source: record.source,
        });
    }

    fn on_meanings_ready(&self, key: &WordKey, record: MeaningsRecord) {
        self.push(SinkCall::Meanings {
            word: key.to_string(),
            parts_of_speech: record.parts_of_speech().iter().map(|p| p.to_string()).collect(),
        });
    }

    fn on_audio_played(&self, key: &WordKey, _accent: Accent) {
        self.push(SinkCall::AudioPlayed(key.to_string()));
    }

    fn on_image_ready(&self, key: &WordKey, path: PathBuf) {
        self.push(SinkCall::Image(key.to_string(), path));
    }
}

#[derive(Default)]
pub struct RecordingPlayer {
    played: Mutex<Vec<PathBuf>>,
}

impl RecordingPlayer {
    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, path: &Path) -> anyhow::Result<()> {
        self.played.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Defaults pointed at a temp dir: no backoff, only translation and meanings
pub fn test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.cache.data_dir = data_dir.display().to_string();
    config.translator.primary_api_key = String::new();
    config.network.backoff_ms = 0;
    config.audio.auto_pronounce = false;
    config.audio.peer_wait_ms = 200;
    config.audio.poll_interval_ms = 10;
    config.images.enabled = false;
    config.images.pexels_api_key = String::new();
    config
}

/// A running coordinator wired to a mock network, a recording sink and player
pub struct Harness {
    pub dir: TempDir,
    pub layout: CacheLayout,
    pub transport: Arc<MockTransport>,
    pub sink: Arc<RecordingSink>,
    pub player: Arc<RecordingPlayer>,
    pub coordinator: Arc<Coordinator>,
    cancel: CancellationToken,
}

impl Harness {
    pub fn start(transport: MockTransport) -> Self {
        Self::start_with(transport, |_| {})
    }

    pub fn start_with(transport: MockTransport, configure: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::start_in(dir, transport, configure)
    }

    /// Reuse a data directory, e.g. one with pre-seeded cache files
    pub fn start_in(dir: TempDir, transport: MockTransport, configure: impl FnOnce(&mut Config)) -> Self {
        let mut config = test_config(dir.path());
        configure(&mut config);

        let layout = CacheLayout::new(dir.path());
        layout.ensure().unwrap();

        let transport = Arc::new(transport);
        let shared = transport.clone();
        let providers = Providers::build(&config, |_, _| Ok(shared.clone() as Arc<dyn HttpTransport>)).unwrap();
        let workers = build_workers(&config, &layout, &providers);

        let sink = Arc::new(RecordingSink::default());
        let player = Arc::new(RecordingPlayer::default());
        let cancel = CancellationToken::new();
        let coordinator = Coordinator::start(
            workers,
            &config.pools,
            sink.clone(),
            player.clone(),
            cancel.clone(),
        );

        Self {
            dir,
            layout,
            transport,
            sink,
            player,
            coordinator,
            cancel,
        }
    }

    pub fn dicts_file(&self, name: &str) -> PathBuf {
        self.layout.dicts_dir().join(name)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
