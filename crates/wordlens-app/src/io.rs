use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;
use wordlens_config::input::InputSource;
use wordlens_types::{AppEvent, TextSource};

use crate::state::AppState;

const CLIPBOARD_POLL: Duration = Duration::from_millis(500);

/// Feed typed text from the configured source into the event loop
pub async fn watcher_io(
    state: Arc<AppState>,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (source, ws_url) = {
        let config = state.config.read().await;
        (config.input.source, config.input.ws_url.clone())
    };

    let watcher = async {
        match source {
            InputSource::Stdin => {
                tracing::info!("Reading words from stdin");
                wordlens_io::stdin::read_stdin_lines(forward(&event_tx, TextSource::Stdin)).await?;
                tracing::info!("stdin closed, waiting for shutdown");
            }
            InputSource::Clipboard => {
                tracing::info!("Starting clipboard watcher");
                wordlens_io::clipboard::watch_clipboard(
                    CLIPBOARD_POLL,
                    forward(&event_tx, TextSource::Clipboard),
                )
                .await?;
            }
            InputSource::Websocket => {
                tracing::info!("Starting WebSocket listener on {}", ws_url);
                wordlens_io::ws::start_ws_listener(&ws_url, forward(&event_tx, TextSource::Websocket))
                    .await?;
            }
        }
        // Sources that end on their own keep the app alive until shutdown
        cancel.cancelled().await;
        anyhow::Ok(())
    };

    tokio::select! {
        result = watcher => {
            if let Err(e) = &result {
                tracing::error!("{:?} input failed: {:#}", source, e);
            }
            result
        }
        _ = cancel.cancelled() => {
            tracing::info!("{:?} input stopping", source);
            Ok(())
        }
    }
}

/// Callback that queues each text for the event loop, in arrival order
fn forward(tx: &AsyncSender<AppEvent>, source: TextSource) -> impl FnMut(String) + Send + 'static {
    let tx = tx.clone();
    move |text| match tx.try_send(AppEvent::RawTextInput { text, source }) {
        Ok(true) => {}
        Ok(false) => tracing::warn!("Input queue full, dropping {:?} text", source),
        Err(e) => tracing::error!("Failed to send {:?} text to app: {}", source, e),
    }
}
