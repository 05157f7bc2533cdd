use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wordlens_config::Config;
use wordlens_config::network::NetworkConfig;
use wordlens_core::{CacheLayout, VocabularyIndex};
use wordlens_lang_english::{
    DictionaryApi, EnglishFrequency, GoogleTranslate, GoogleTts, PexelsImages, WikipediaImages,
    YandexDictionary,
};
use wordlens_provider::{
    HttpTransport, ImageProvider, MeaningsProvider, ReqwestTransport, RetryPolicy,
    RetryingHttpClient, SpeechProvider, TranslationProvider,
};

use crate::coordinator::{Coordinator, Workers};
use crate::pool::FetchWorker;
use crate::player::{AudioPlayer, CommandPlayer, SilentPlayer};
use crate::sink::UiSink;
use crate::snippet::SnippetTranslator;
use crate::workers::audio::AudioSettings;
use crate::workers::{AudioWorker, ImageWorker, MeaningsWorker, TranslationWorker};

/// Everything the event loop needs, built once at startup
pub struct Services {
    pub coordinator: Arc<Coordinator>,
    pub snippets: Arc<SnippetTranslator>,
    pub vocabulary: Arc<dyn VocabularyIndex>,
}

/// External services, one HTTP client (and connection pool) each
pub struct Providers {
    pub primary: Arc<dyn TranslationProvider>,
    pub fallback: Arc<dyn TranslationProvider>,
    pub dictionary: Arc<dyn MeaningsProvider>,
    pub speech: Arc<dyn SpeechProvider>,
    pub images: Vec<Arc<dyn ImageProvider>>,
}

pub fn retry_policy(network: &NetworkConfig) -> RetryPolicy {
    RetryPolicy::new(
        network.max_retries,
        Duration::from_millis(network.backoff_ms),
        network.retry_statuses.clone(),
    )
}

/// `reqwest` transport for one provider
pub fn reqwest_transport(
    network: &NetworkConfig,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn HttpTransport>> {
    let transport = ReqwestTransport::new(
        &network.user_agent,
        timeout,
        network.pool_max_idle_per_host,
    )?;
    Ok(Arc::new(transport))
}

impl Providers {
    /// `transport` is asked once per provider
    pub fn build<F>(config: &Config, mut transport: F) -> anyhow::Result<Self>
    where
        F: FnMut(&str, Duration) -> anyhow::Result<Arc<dyn HttpTransport>>,
    {
        let policy = retry_policy(&config.network);
        let mut client = |name: &str, base_url: &str, timeout_ms: u64| -> anyhow::Result<RetryingHttpClient> {
            let timeout = Duration::from_millis(timeout_ms);
            Ok(RetryingHttpClient::new(name, base_url, transport(name, timeout)?)
                .with_policy(policy.clone())
                .with_timeout(timeout))
        };

        let translator = &config.translator;
        let primary = YandexDictionary::new(
            client("yandex", &translator.primary_url, translator.timeout_ms)?,
            translator.primary_api_key.clone(),
            &translator.from_lang,
            &translator.to_lang,
        );
        let fallback = GoogleTranslate::new(
            client("google-translate", &translator.fallback_url, translator.timeout_ms)?,
            &translator.from_lang,
            &translator.to_lang,
        );

        let dictionary = DictionaryApi::new(client(
            "dictionary",
            &config.dictionary.api_url,
            config.dictionary.timeout_ms,
        )?);

        let speech = GoogleTts::new(client("google-tts", &config.audio.tts_url, config.audio.timeout_ms)?);

        let images = &config.images;
        let mut image_providers: Vec<Arc<dyn ImageProvider>> = Vec::new();
        if images.enabled {
            image_providers.push(Arc::new(PexelsImages::new(
                client("pexels", &images.pexels_url, images.timeout_ms)?,
                &images.pexels_api_key,
            )));
            image_providers.push(Arc::new(WikipediaImages::new(client(
                "wikipedia",
                &images.wiki_url,
                images.timeout_ms,
            )?)));
        }

        Ok(Self {
            primary: Arc::new(primary),
            fallback: Arc::new(fallback),
            dictionary: Arc::new(dictionary),
            speech: Arc::new(speech),
            images: image_providers,
        })
    }
}

pub fn build_workers(config: &Config, layout: &CacheLayout, providers: &Providers) -> Workers {
    let audio: Option<Arc<dyn FetchWorker>> = config.audio.auto_pronounce.then(|| {
        let settings = AudioSettings {
            accent: config.audio.accent,
            peer_wait: Duration::from_millis(config.audio.peer_wait_ms),
            poll_interval: Duration::from_millis(config.audio.poll_interval_ms),
            stream_start_chunks: config.audio.stream_start_chunks,
        };
        Arc::new(AudioWorker::new(layout.audio_dir(), providers.speech.clone(), settings))
            as Arc<dyn FetchWorker>
    });

    let image: Option<Arc<dyn FetchWorker>> = config.images.enabled.then(|| {
        Arc::new(ImageWorker::new(layout.images_dir(), providers.images.clone()))
            as Arc<dyn FetchWorker>
    });

    Workers {
        translation: Arc::new(TranslationWorker::new(
            layout.dicts_dir(),
            providers.primary.clone(),
            providers.fallback.clone(),
        )),
        meanings: Arc::new(MeaningsWorker::new(
            layout.dicts_dir(),
            providers.dictionary.clone(),
            config.dictionary.retry_capitalized,
        )),
        audio,
        image,
    }
}

pub fn build_player(config: &Config) -> Arc<dyn AudioPlayer> {
    match config.audio.player_command.as_deref().and_then(CommandPlayer::from_command_line) {
        Some(player) => Arc::new(player),
        None => {
            tracing::info!("No audio player configured, pronunciations are fetched but not played");
            Arc::new(SilentPlayer)
        }
    }
}

/// Wire providers, workers and the coordinator; must run inside the runtime
pub fn build_services(
    config: &Config,
    layout: &CacheLayout,
    sink: Arc<dyn UiSink>,
    cancel: CancellationToken,
) -> anyhow::Result<Services> {
    let providers = Providers::build(config, |_, timeout| reqwest_transport(&config.network, timeout))?;
    let workers = build_workers(config, layout, &providers);

    let coordinator = Coordinator::start(workers, &config.pools, sink, build_player(config), cancel);
    tracing::info!("Coordinator started for {:?}", coordinator.categories());

    let snippets = Arc::new(SnippetTranslator::new(
        providers.fallback.clone(),
        config.cache.hover_capacity,
    ));

    let vocabulary: Arc<dyn VocabularyIndex> =
        Arc::new(EnglishFrequency::load_or_default(&config.vocab.word_list_path));

    Ok(Services {
        coordinator,
        snippets,
        vocabulary,
    })
}
