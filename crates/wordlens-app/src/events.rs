use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use wordlens_types::AppEvent;

use crate::setup::Services;
use crate::state::AppState;

pub mod text_input;

use text_input::handle_text_input;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    services: Arc<Services>,
) -> anyhow::Result<()> {
    tracing::info!(
        "[EVENT_LOOP] Starting main loop, cache at {}",
        state.layout.root().display()
    );
    app_to_ui_tx.send(AppEvent::BackendReady).await?;

    loop {
        let event = ui_to_app_rx.recv().await?;
        handle_events(&state, &services, &app_to_ui_tx, event).await?;
    }
}

async fn handle_events(
    state: &AppState,
    services: &Arc<Services>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::RawTextInput { text, source } => {
            tracing::debug!("Text from {:?}: {} chars", source, text.len());
            let level = state.config.read().await.vocab.level;

            let action = handle_text_input(&text, level, services, app_to_ui_tx);
            tracing::debug!("Input handled: {:?}", action);
        }
        AppEvent::ConfigChanged => {
            tracing::info!("Config changed; provider settings apply on restart");
        }
        AppEvent::StatusUpdate(status) => {
            tracing::info!("Status: {}", status);
        }
        AppEvent::ResetDisplay { .. }
        | AppEvent::ShowTranslation { .. }
        | AppEvent::ShowMeanings { .. }
        | AppEvent::AudioPlayed { .. }
        | AppEvent::ShowImage { .. }
        | AppEvent::ShowSnippet { .. }
        | AppEvent::BackendReady => {
            // UI-only event, ignore in backend
        }
    }

    Ok(())
}
